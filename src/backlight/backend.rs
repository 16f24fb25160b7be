// SPDX-License-Identifier: GPL-3.0-only
//! Backlight devices as seen by the OS backlight class

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::codecs::{BrightnessCodec, IntensityCodec};
use crate::error::{BacklightError, Result};
use crate::gpu::RegisterBus;

/// Where the brightness control lives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BacklightType {
    /// Direct register access
    #[default]
    Raw,
    /// Platform driver interface
    #[allow(dead_code)]
    Platform,
    /// Firmware interface (ACPI and the like)
    #[allow(dead_code)]
    Firmware,
}

/// Properties published with a backlight device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BacklightProperties {
    pub kind: BacklightType,
    pub max_brightness: u32,
    /// Last level requested through the class
    pub brightness: u32,
    /// Set by the core between suspend and resume
    pub suspended: bool,
}

impl BacklightProperties {
    pub fn raw(max_brightness: u32) -> Self {
        Self {
            kind: BacklightType::Raw,
            max_brightness,
            ..Default::default()
        }
    }
}

/// Codec bound to the register bus of the GPU it drives
#[derive(Debug, Clone)]
pub struct BacklightOps {
    pub codec: BrightnessCodec,
    pub bus: Arc<dyn RegisterBus>,
}

impl BacklightOps {
    pub fn new(codec: BrightnessCodec, bus: Arc<dyn RegisterBus>) -> Self {
        Self { codec, bus }
    }

    pub fn get_brightness(&self) -> u32 {
        self.codec.get_intensity(self.bus.as_ref())
    }

    pub fn update_status(&self, props: &BacklightProperties) -> Result<()> {
        self.codec.set_intensity(self.bus.as_ref(), props.brightness)
    }
}

/// A registered backlight device
///
/// Brightness reads and writes go through one lock, so two callers can never
/// interleave a read-modify-write on the same device.
#[derive(Debug)]
pub struct BacklightDevice {
    name: String,
    parent: Option<String>,
    ops: BacklightOps,
    props: Mutex<BacklightProperties>,
}

/// Handle held by the driver and the backlight class
pub type BacklightHandle = Arc<BacklightDevice>;

impl BacklightDevice {
    pub fn new(
        name: impl Into<String>,
        parent: Option<String>,
        ops: BacklightOps,
        props: BacklightProperties,
    ) -> Self {
        Self {
            name: name.into(),
            parent,
            ops,
            props: Mutex::new(props),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the connector the device hangs off
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn codec(&self) -> &BrightnessCodec {
        &self.ops.codec
    }

    pub fn core_suspend_resume(&self) -> bool {
        self.ops.codec.core_suspend_resume()
    }

    pub fn props(&self) -> BacklightProperties {
        *self.lock()
    }

    pub fn brightness(&self) -> u32 {
        self.lock().brightness
    }

    pub fn max_brightness(&self) -> u32 {
        self.lock().max_brightness
    }

    /// Level currently programmed in hardware
    pub fn actual_brightness(&self) -> u32 {
        let _props = self.lock();
        self.ops.get_brightness()
    }

    /// Store `value` and program it
    pub fn set_brightness(&self, value: u32) -> Result<()> {
        let mut props = self.lock();
        if value > props.max_brightness {
            return Err(BacklightError::BrightnessOutOfRange {
                value,
                max: props.max_brightness,
            });
        }
        props.brightness = value;
        self.ops.update_status(&props)
    }

    /// Program the stored level
    pub fn update_status(&self) -> Result<()> {
        let props = self.lock();
        self.ops.update_status(&props)
    }

    /// Adopt the hardware level as the stored level
    pub fn sync_from_hardware(&self) -> u32 {
        let mut props = self.lock();
        props.brightness = self.ops.get_brightness();
        props.brightness
    }

    pub(crate) fn set_suspended(&self, suspended: bool) -> Result<()> {
        let mut props = self.lock();
        props.suspended = suspended;
        self.ops.update_status(&props)
    }

    fn lock(&self) -> MutexGuard<'_, BacklightProperties> {
        self.props.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// OS backlight class
pub trait BacklightService: std::fmt::Debug + Send + Sync {
    /// Create and publish a device
    fn register(
        &self,
        name: &str,
        parent: Option<&str>,
        ops: BacklightOps,
        props: BacklightProperties,
    ) -> anyhow::Result<BacklightHandle>;

    /// Withdraw a device published by [`BacklightService::register`]
    fn unregister(&self, handle: &BacklightHandle);

    /// Push the stored level to hardware
    fn update_status(&self, handle: &BacklightHandle) -> Result<()> {
        handle.update_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::{CurieCodec, KeplerCodec};
    use crate::gpu::MemoryRegisterBus;
    use crate::gpu::regs::NV40_PMC_BACKLIGHT;

    fn curie_device(bus: Arc<MemoryRegisterBus>) -> BacklightDevice {
        let ops = BacklightOps::new(BrightnessCodec::Curie(CurieCodec), bus);
        BacklightDevice::new("nv_backlight", None, ops, BacklightProperties::raw(31))
    }

    #[test]
    fn test_set_brightness_programs_hardware() {
        let bus = Arc::new(MemoryRegisterBus::with_registers([(NV40_PMC_BACKLIGHT, 0x0005_0000)]));
        let device = curie_device(Arc::clone(&bus));

        device.set_brightness(20).unwrap();
        assert_eq!(device.brightness(), 20);
        assert_eq!(device.actual_brightness(), 20);
        assert_eq!(bus.rd32(NV40_PMC_BACKLIGHT), 20 << 16);
    }

    #[test]
    fn test_set_brightness_rejects_out_of_range() {
        let bus = Arc::new(MemoryRegisterBus::with_registers([(NV40_PMC_BACKLIGHT, 0x0005_0000)]));
        let device = curie_device(Arc::clone(&bus));

        let err = device.set_brightness(32).unwrap_err();
        assert!(matches!(
            err,
            BacklightError::BrightnessOutOfRange { value: 32, max: 31 }
        ));
        assert_eq!(bus.rd32(NV40_PMC_BACKLIGHT), 0x0005_0000);
        assert_eq!(device.brightness(), 0);
    }

    #[test]
    fn test_sync_from_hardware() {
        let bus = Arc::new(MemoryRegisterBus::with_registers([(NV40_PMC_BACKLIGHT, 0x0009_0000)]));
        let device = curie_device(bus);

        assert_eq!(device.sync_from_hardware(), 9);
        assert_eq!(device.props().brightness, 9);
    }

    #[test]
    fn test_invalid_divisor_surfaces_from_update() {
        let bus = Arc::new(MemoryRegisterBus::new());
        let ops = BacklightOps::new(BrightnessCodec::Kepler(KeplerCodec::new(0)), bus);
        let device = BacklightDevice::new("nv_backlight", None, ops, BacklightProperties::raw(100));

        assert_eq!(device.sync_from_hardware(), 100);
        assert!(matches!(
            device.update_status(),
            Err(BacklightError::InvalidDivisor { or: 0 })
        ));
    }

    #[test]
    fn test_concurrent_writes_keep_unrelated_bits() {
        let bus = Arc::new(MemoryRegisterBus::with_registers([(NV40_PMC_BACKLIGHT, 0xa5e0_1234)]));
        let device = Arc::new(curie_device(Arc::clone(&bus)));

        let handles: Vec<_> = (0..4u32)
            .map(|t| {
                let device = Arc::clone(&device);
                std::thread::spawn(move || {
                    for i in 0..200u32 {
                        device.set_brightness((t * 7 + i) % 32).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(bus.rd32(NV40_PMC_BACKLIGHT) & !0x001f_0000, 0xa5e0_1234);
    }
}
