// SPDX-License-Identifier: GPL-3.0-only
//! Interfaces to the rest of the GPU driver
//!
//! Register access, device identification, connector enumeration and
//! platform probing are owned by the surrounding driver. This module only
//! describes what the backlight code needs from them.

pub mod bus;
pub mod connector;
pub mod device;
pub mod platform;
pub mod regs;

pub use bus::{MemoryRegisterBus, RegisterBus};
pub use connector::{Connector, ConnectorType, Encoder, OutputType};
pub use device::{ChipsetFamily, DeviceInfo, GpuDevice, PciIds};
pub use platform::{PlatformProbe, StaticProbe};
