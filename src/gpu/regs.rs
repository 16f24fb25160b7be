// SPDX-License-Identifier: GPL-3.0-only
//! Backlight register layout
//!
//! Offsets are in the GPU's MMIO space. The NV50 display block repeats its
//! SOR registers every 0x800 bytes, indexed by the encoder's output resource
//! number ("or").

/// Shared PMC backlight register on NV40 family chips
pub const NV40_PMC_BACKLIGHT: u32 = 0x0000_15f0;
/// Intensity field, bits 16..=20
pub const NV40_PMC_BACKLIGHT_MASK: u32 = 0x001f_0000;
pub const NV40_PMC_BACKLIGHT_SHIFT: u32 = 16;

const NV50_PDISP_SOR_STRIDE: u32 = 0x800;

/// PWM divisor for the SOR driving output `or`
pub const fn nv50_pdisp_sor_pwm_div(or: u32) -> u32 {
    0x0061_c080 + or * NV50_PDISP_SOR_STRIDE
}

/// PWM control for the SOR driving output `or`
pub const fn nv50_pdisp_sor_pwm_ctl(or: u32) -> u32 {
    0x0061_c084 + or * NV50_PDISP_SOR_STRIDE
}

/// Latch bit: the written level takes effect
pub const NV50_PDISP_SOR_PWM_CTL_NEW: u32 = 0x8000_0000;
pub const NV50_PDISP_SOR_PWM_CTL_VAL: u32 = 0x0000_07ff;

/// Set alongside NEW on GT215 and later
pub const NVA3_PDISP_SOR_PWM_CTL_UNK: u32 = 0x4000_0000;
pub const NVA3_PDISP_SOR_PWM_CTL_VAL: u32 = 0x00ff_ffff;
