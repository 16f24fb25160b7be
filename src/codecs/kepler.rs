// SPDX-License-Identifier: GPL-3.0-only
//! GT215 and later backlight (late Tesla through Maxwell)

use super::{IntensityCodec, percent_to_raw, raw_to_percent};
use crate::error::{BacklightError, Result};
use crate::gpu::RegisterBus;
use crate::gpu::regs::{
    NV50_PDISP_SOR_PWM_CTL_NEW, NVA3_PDISP_SOR_PWM_CTL_UNK, NVA3_PDISP_SOR_PWM_CTL_VAL,
    nv50_pdisp_sor_pwm_ctl, nv50_pdisp_sor_pwm_div,
};

/// Percent-based codec scaled by the hardware PWM divisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeplerCodec {
    pub or: u32,
}

impl KeplerCodec {
    pub fn new(or: u32) -> Self {
        Self { or }
    }
}

impl IntensityCodec for KeplerCodec {
    fn max_brightness(&self) -> u32 {
        100
    }

    fn get_intensity(&self, bus: &dyn RegisterBus) -> u32 {
        let div = bus.rd32(nv50_pdisp_sor_pwm_div(self.or));
        let val = bus.rd32(nv50_pdisp_sor_pwm_ctl(self.or)) & NVA3_PDISP_SOR_PWM_CTL_VAL;

        if div != 0 && div >= val {
            return raw_to_percent(val, div);
        }

        // no usable divisor: report full brightness rather than a bogus level
        trace!(or = self.or, div, val, "inconsistent PWM divisor");
        100
    }

    fn set_intensity(&self, bus: &dyn RegisterBus, value: u32) -> Result<()> {
        let div = bus.rd32(nv50_pdisp_sor_pwm_div(self.or));
        if div == 0 {
            return Err(BacklightError::InvalidDivisor { or: self.or });
        }

        let val = percent_to_raw(value.min(100), div) & NVA3_PDISP_SOR_PWM_CTL_VAL;
        bus.wr32(
            nv50_pdisp_sor_pwm_ctl(self.or),
            val | NV50_PDISP_SOR_PWM_CTL_NEW | NVA3_PDISP_SOR_PWM_CTL_UNK,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::MemoryRegisterBus;

    #[test]
    fn test_zero_divisor_reads_full() {
        let bus = MemoryRegisterBus::with_registers([(nv50_pdisp_sor_pwm_ctl(0), 0x1234)]);
        assert_eq!(KeplerCodec::new(0).get_intensity(&bus), 100);
    }

    #[test]
    fn test_level_above_divisor_reads_full() {
        let bus = MemoryRegisterBus::with_registers([
            (nv50_pdisp_sor_pwm_div(0), 0x100),
            (nv50_pdisp_sor_pwm_ctl(0), 0x200),
        ]);
        assert_eq!(KeplerCodec::new(0).get_intensity(&bus), 100);
    }

    #[test]
    fn test_zero_divisor_rejects_write() {
        let bus = MemoryRegisterBus::with_registers([(nv50_pdisp_sor_pwm_ctl(0), 0x1234)]);
        let err = KeplerCodec::new(0).set_intensity(&bus, 50).unwrap_err();
        assert!(matches!(err, BacklightError::InvalidDivisor { or: 0 }));
        // nothing written
        assert_eq!(bus.rd32(nv50_pdisp_sor_pwm_ctl(0)), 0x1234);
    }

    #[test]
    fn test_scales_by_hardware_divisor() {
        let bus = MemoryRegisterBus::with_registers([(nv50_pdisp_sor_pwm_div(2), 0x4b0)]);
        let codec = KeplerCodec::new(2);

        codec.set_intensity(&bus, 50).unwrap();
        assert_eq!(
            bus.rd32(nv50_pdisp_sor_pwm_ctl(2)),
            NV50_PDISP_SOR_PWM_CTL_NEW | NVA3_PDISP_SOR_PWM_CTL_UNK | 0x258
        );
        assert_eq!(codec.get_intensity(&bus), 50);

        codec.set_intensity(&bus, 33).unwrap();
        assert!(codec.get_intensity(&bus).abs_diff(33) <= 1);
    }

    #[test]
    fn test_out_of_range_saturates() {
        let bus = MemoryRegisterBus::with_registers([(nv50_pdisp_sor_pwm_div(0), 0x4b0)]);
        KeplerCodec::new(0).set_intensity(&bus, u32::MAX).unwrap();
        assert_eq!(
            bus.rd32(nv50_pdisp_sor_pwm_ctl(0)),
            NV50_PDISP_SOR_PWM_CTL_NEW | NVA3_PDISP_SOR_PWM_CTL_UNK | 0x4b0
        );
    }
}
