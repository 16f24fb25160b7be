// SPDX-License-Identifier: GPL-3.0-only
//! Apple machine quirks

pub mod imac91;

/// Apple PCI subsystem vendor id
pub const VENDOR_ID: u16 = 0x106b;
