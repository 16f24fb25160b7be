// SPDX-License-Identifier: GPL-3.0-only
//! Error types for the backlight subsystem
//!
//! Hardware without a usable backlight is not an error: those cases come back
//! as [`crate::InitOutcome`] variants. Only the conditions below are surfaced
//! to the caller.

use thiserror::Error;

/// Backlight subsystem error type
#[derive(Error, Debug)]
pub enum BacklightError {
    /// Every name suffix in 0..100 is taken, or the pool was torn down
    #[error("no free backlight identity (ids 0-99 in use)")]
    IdentityExhausted,

    /// A panel connector without an LVDS or DisplayPort encoder
    #[error("no LVDS or DisplayPort encoder on connector {connector}")]
    EncoderNotFound { connector: String },

    /// The OS backlight service refused the device
    #[error("failed to register backlight device {name}: {source}")]
    Registration {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// The PWM divisor register reads zero, so a level cannot be scaled
    #[error("PWM divisor on output {or} is zero")]
    InvalidDivisor { or: u32 },

    /// Requested brightness is above the device maximum
    #[error("brightness {value} out of range (max {max})")]
    BrightnessOutOfRange { value: u32, max: u32 },

    /// A backlight device with this name is already registered
    #[error("backlight device {0} already registered")]
    DuplicateName(String),
}

/// Result type alias for BacklightError
pub type Result<T> = std::result::Result<T, BacklightError>;
