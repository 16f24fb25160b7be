// SPDX-License-Identifier: GPL-3.0-only
//! iMac9,1 (early 2009, GeForce 9400)

use crate::devices::DeviceSpec;

/// GPU PCI device id (MCP79 / GeForce 9400)
pub const PCI_DEVICE: u16 = 0x0867;

/// Subsystem device id of the iMac9,1 board
pub const SUBSYSTEM_DEVICE: u16 = 0x00ad;

/// Backlight quirk for the iMac9,1
///
/// Raw levels below 0x92 look the same as 0x92. The card's init scripts can
/// also leave the PWM divisor at 0x84, which makes the level inconsistent, so
/// the divisor is pinned to 1 on every write.
pub const SPEC: DeviceSpec = DeviceSpec {
    pci_device: PCI_DEVICE,
    subsystem_vendor: super::VENDOR_ID,
    subsystem_device: SUBSYSTEM_DEVICE,
    name: "iMac9,1",
    min_brightness_value: 0x92,
    max_brightness_value: 0x401,
    pwm_div: 1,
};
