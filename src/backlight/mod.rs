// SPDX-License-Identifier: GPL-3.0-only
pub mod backend;
pub mod enumeration;
pub mod manager;
pub mod service;

pub use backend::{
    BacklightDevice, BacklightHandle, BacklightOps, BacklightProperties, BacklightService,
    BacklightType,
};
pub use enumeration::InitOutcome;
pub use manager::{BacklightManager, BacklightModule};
pub use service::MemoryBacklightService;
