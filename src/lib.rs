// SPDX-License-Identifier: GPL-3.0-only
//! Panel backlight control for NV40 (Curie) through Maxwell GPUs
//!
//! The crate sits between a GPU driver and the OS backlight class. It picks
//! the panel connector that owns the backlight, chooses the register codec
//! matching the chipset generation, names the device and keeps track of its
//! lifetime. The register bus, connector list and OS backlight service are
//! supplied by the caller through the traits in [`gpu`] and [`backlight`].

#[macro_use]
extern crate tracing;

pub mod backlight;
pub mod codecs;
pub mod config;
pub mod devices;
pub mod error;
pub mod gpu;
pub mod identity;

pub use backlight::{BacklightManager, BacklightModule, InitOutcome};
pub use error::{BacklightError, Result};
