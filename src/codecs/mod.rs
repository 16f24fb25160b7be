// SPDX-License-Identifier: GPL-3.0-only
//! Brightness register codecs
//!
//! Each chipset generation stores the backlight level differently. A codec
//! translates between the level the OS sees (0..=max_brightness) and the raw
//! register contents. Codecs hold no state beyond the output they address;
//! all hardware state stays in the registers.
//!
//! Scaling truncates on write and rounds to nearest on read, matching what
//! the hardware reports back after a write.

pub mod curie;
pub mod kepler;
pub mod tesla;

pub use curie::CurieCodec;
pub use kepler::KeplerCodec;
pub use tesla::{QuirkCodec, TeslaCodec};

use crate::error::Result;
use crate::gpu::RegisterBus;

/// Common interface of all register codecs
pub trait IntensityCodec: std::fmt::Debug + Send + Sync {
    /// Highest level accepted by [`IntensityCodec::set_intensity`]
    fn max_brightness(&self) -> u32;

    /// Read the current level from hardware
    fn get_intensity(&self, bus: &dyn RegisterBus) -> u32;

    /// Program `value` (0..=max_brightness) into hardware
    fn set_intensity(&self, bus: &dyn RegisterBus, value: u32) -> Result<()>;
}

/// Codec bound to a backlight device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrightnessCodec {
    /// NV40 shared PMC register
    Curie(CurieCodec),
    /// NV50 fixed-divisor PWM
    Tesla(TeslaCodec),
    /// NV50 PWM with a machine-specific raw range
    Quirk(QuirkCodec),
    /// GT215+ PWM with a hardware divisor
    Kepler(KeplerCodec),
}

impl BrightnessCodec {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            BrightnessCodec::Curie(_) => "nv40",
            BrightnessCodec::Tesla(_) => "nv50",
            BrightnessCodec::Quirk(_) => "nv50-quirk",
            BrightnessCodec::Kepler(_) => "nva3",
        }
    }

    /// Output resource the codec addresses, if any
    pub fn output(&self) -> Option<u32> {
        match self {
            BrightnessCodec::Curie(_) => None,
            BrightnessCodec::Tesla(codec) => Some(codec.or),
            BrightnessCodec::Quirk(codec) => Some(codec.or),
            BrightnessCodec::Kepler(codec) => Some(codec.or),
        }
    }

    /// Whether the OS backlight core should re-apply the level on resume
    pub fn core_suspend_resume(&self) -> bool {
        true
    }

    fn inner(&self) -> &dyn IntensityCodec {
        match self {
            BrightnessCodec::Curie(codec) => codec,
            BrightnessCodec::Tesla(codec) => codec,
            BrightnessCodec::Quirk(codec) => codec,
            BrightnessCodec::Kepler(codec) => codec,
        }
    }
}

impl IntensityCodec for BrightnessCodec {
    fn max_brightness(&self) -> u32 {
        self.inner().max_brightness()
    }

    fn get_intensity(&self, bus: &dyn RegisterBus) -> u32 {
        self.inner().get_intensity(bus)
    }

    fn set_intensity(&self, bus: &dyn RegisterBus, value: u32) -> Result<()> {
        self.inner().set_intensity(bus, value)
    }
}

/// Raw PWM level to percent, rounding to nearest
fn raw_to_percent(raw: u32, div: u32) -> u32 {
    let div = u64::from(div);
    ((u64::from(raw) * 100 + div / 2) / div) as u32
}

/// Percent to raw PWM level, truncating
fn percent_to_raw(percent: u32, div: u32) -> u32 {
    (u64::from(percent) * u64::from(div) / 100) as u32
}
