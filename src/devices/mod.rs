// SPDX-License-Identifier: GPL-3.0-only
//! Machine-specific backlight quirks organized by manufacturer

pub mod apple;

use crate::gpu::PciIds;

/// Backlight quirk for one machine
///
/// Machines are matched on the GPU's PCI device id together with the
/// subsystem vendor and device, which identify the board it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSpec {
    /// GPU PCI device id
    pub pci_device: u16,

    /// Subsystem vendor (the machine maker)
    pub subsystem_vendor: u16,

    /// Subsystem device (the machine model)
    pub subsystem_device: u16,

    /// Human-readable machine name
    pub name: &'static str,

    /// Lowest raw PWM level that visibly differs from off
    pub min_brightness_value: u32,

    /// Highest raw PWM level
    pub max_brightness_value: u32,

    /// Divisor the PWM must run with; firmware may leave another value
    pub pwm_div: u32,
}

impl DeviceSpec {
    /// Raw level span exposed to user space (max - min)
    pub const fn brightness_range(&self) -> u32 {
        self.max_brightness_value - self.min_brightness_value
    }

    pub fn matches(&self, pci: &PciIds) -> bool {
        pci.matches(self.pci_device, self.subsystem_vendor, self.subsystem_device)
    }
}

const KNOWN_DEVICES: &[DeviceSpec] = &[apple::imac91::SPEC];

/// Look up the quirk for the machine a GPU sits in
pub fn get_device_spec(pci: &PciIds) -> Option<DeviceSpec> {
    KNOWN_DEVICES.iter().find(|spec| spec.matches(pci)).copied()
}
