// SPDX-License-Identifier: GPL-3.0-only
//! NV40 family backlight
//!
//! The level is a 5-bit field in a PMC register shared with unrelated
//! control bits, so writes go through read-modify-write.

use super::IntensityCodec;
use crate::error::Result;
use crate::gpu::RegisterBus;
use crate::gpu::regs::{NV40_PMC_BACKLIGHT, NV40_PMC_BACKLIGHT_MASK, NV40_PMC_BACKLIGHT_SHIFT};

const MAX_BRIGHTNESS: u32 = NV40_PMC_BACKLIGHT_MASK >> NV40_PMC_BACKLIGHT_SHIFT;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurieCodec;

impl CurieCodec {
    /// Firmware leaves the field at zero when the board has no backlight
    /// wired to the GPU
    pub fn is_enabled(bus: &dyn RegisterBus) -> bool {
        bus.rd32(NV40_PMC_BACKLIGHT) & NV40_PMC_BACKLIGHT_MASK != 0
    }
}

impl IntensityCodec for CurieCodec {
    fn max_brightness(&self) -> u32 {
        MAX_BRIGHTNESS
    }

    fn get_intensity(&self, bus: &dyn RegisterBus) -> u32 {
        (bus.rd32(NV40_PMC_BACKLIGHT) & NV40_PMC_BACKLIGHT_MASK) >> NV40_PMC_BACKLIGHT_SHIFT
    }

    fn set_intensity(&self, bus: &dyn RegisterBus, value: u32) -> Result<()> {
        let field = value.min(MAX_BRIGHTNESS) << NV40_PMC_BACKLIGHT_SHIFT;
        let reg = bus.mask(NV40_PMC_BACKLIGHT, NV40_PMC_BACKLIGHT_MASK, field);
        trace!("nv40 backlight: {} (reg was {:#010x})", value, reg);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::MemoryRegisterBus;

    #[test]
    fn test_round_trip() {
        let bus = MemoryRegisterBus::new();
        let codec = CurieCodec;

        codec.set_intensity(&bus, 31).unwrap();
        assert_eq!(codec.get_intensity(&bus), 31);

        codec.set_intensity(&bus, 0).unwrap();
        assert_eq!(codec.get_intensity(&bus), 0);

        codec.set_intensity(&bus, 12).unwrap();
        assert_eq!(codec.get_intensity(&bus), 12);
    }

    #[test]
    fn test_preserves_unrelated_bits() {
        let bus = MemoryRegisterBus::with_registers([(NV40_PMC_BACKLIGHT, 0xa5e0_1234)]);
        let codec = CurieCodec;
        assert_eq!(codec.get_intensity(&bus), 0x00);

        codec.set_intensity(&bus, 31).unwrap();
        assert_eq!(bus.rd32(NV40_PMC_BACKLIGHT), 0xa5ff_1234);

        codec.set_intensity(&bus, 0).unwrap();
        assert_eq!(bus.rd32(NV40_PMC_BACKLIGHT), 0xa5e0_1234);
    }

    #[test]
    fn test_is_enabled() {
        let off = MemoryRegisterBus::with_registers([(NV40_PMC_BACKLIGHT, 0xffe0_ffff)]);
        assert!(!CurieCodec::is_enabled(&off));

        let on = MemoryRegisterBus::with_registers([(NV40_PMC_BACKLIGHT, 0x0001_0000)]);
        assert!(CurieCodec::is_enabled(&on));
    }

    #[test]
    fn test_out_of_range_saturates() {
        let bus = MemoryRegisterBus::with_registers([(NV40_PMC_BACKLIGHT, 0x8000_0001)]);
        CurieCodec.set_intensity(&bus, 1000).unwrap();
        assert_eq!(bus.rd32(NV40_PMC_BACKLIGHT), 0x801f_0001);
    }
}
