// SPDX-License-Identifier: GPL-3.0-only
//! NV50 family backlight (Tesla and the early Fermi-era IGPs)
//!
//! The display engine drives the panel PWM per SOR. On these chips the
//! divisor is not reliable, so the level is scaled against a fixed one.

use super::{IntensityCodec, percent_to_raw, raw_to_percent};
use crate::devices::DeviceSpec;
use crate::error::Result;
use crate::gpu::RegisterBus;
use crate::gpu::regs::{
    NV50_PDISP_SOR_PWM_CTL_NEW, NV50_PDISP_SOR_PWM_CTL_VAL, nv50_pdisp_sor_pwm_ctl,
    nv50_pdisp_sor_pwm_div,
};

/// Fixed PWM divisor
pub const NV50_PWM_DIV: u32 = 1025;

/// Percent-based codec for NV50 PWM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeslaCodec {
    pub or: u32,
}

impl TeslaCodec {
    pub fn new(or: u32) -> Self {
        Self { or }
    }
}

impl IntensityCodec for TeslaCodec {
    fn max_brightness(&self) -> u32 {
        100
    }

    fn get_intensity(&self, bus: &dyn RegisterBus) -> u32 {
        let val = bus.rd32(nv50_pdisp_sor_pwm_ctl(self.or)) & NV50_PDISP_SOR_PWM_CTL_VAL;
        raw_to_percent(val, NV50_PWM_DIV)
    }

    fn set_intensity(&self, bus: &dyn RegisterBus, value: u32) -> Result<()> {
        let val = percent_to_raw(value.min(100), NV50_PWM_DIV);
        bus.wr32(
            nv50_pdisp_sor_pwm_ctl(self.or),
            NV50_PDISP_SOR_PWM_CTL_NEW | val,
        );
        Ok(())
    }
}

/// Raw-level codec for machines with a quirk entry
///
/// The OS sees `0..=max - min`; the register holds `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuirkCodec {
    pub or: u32,
    pub spec: DeviceSpec,
}

impl QuirkCodec {
    pub fn new(or: u32, spec: DeviceSpec) -> Self {
        Self { or, spec }
    }
}

impl IntensityCodec for QuirkCodec {
    fn max_brightness(&self) -> u32 {
        self.spec.brightness_range()
    }

    fn get_intensity(&self, bus: &dyn RegisterBus) -> u32 {
        let val = bus.rd32(nv50_pdisp_sor_pwm_ctl(self.or)) & NV50_PDISP_SOR_PWM_CTL_VAL;

        // everything below the floor looks the same as the floor
        val.saturating_sub(self.spec.min_brightness_value)
    }

    fn set_intensity(&self, bus: &dyn RegisterBus, value: u32) -> Result<()> {
        let val = value.min(self.max_brightness()) + self.spec.min_brightness_value;

        bus.wr32(nv50_pdisp_sor_pwm_div(self.or), self.spec.pwm_div);
        bus.wr32(
            nv50_pdisp_sor_pwm_ctl(self.or),
            NV50_PDISP_SOR_PWM_CTL_NEW | val,
        );
        debug!(
            machine = self.spec.name,
            or = self.or,
            "quirk backlight level {} (raw {:#x})",
            value,
            val
        );
        Ok(())
    }
}
