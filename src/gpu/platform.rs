// SPDX-License-Identifier: GPL-3.0-only
//! Platform backlight arbitration
//!
//! Some machines route panel brightness through a controller outside the
//! GPU (the Apple gmux on dual-GPU MacBook Pros). When one is present it owns
//! the backlight and the GPU driver must stay out of the way.

/// Answers whether another controller owns the panel backlight
pub trait PlatformProbe: std::fmt::Debug + Send + Sync {
    fn competing_controller_present(&self) -> bool;
}

/// Fixed answer, for platforms probed ahead of time
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticProbe {
    pub gmux_present: bool,
}

impl StaticProbe {
    pub fn new(gmux_present: bool) -> Self {
        Self { gmux_present }
    }
}

impl PlatformProbe for StaticProbe {
    fn competing_controller_present(&self) -> bool {
        self.gmux_present
    }
}
