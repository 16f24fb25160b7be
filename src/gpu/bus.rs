// SPDX-License-Identifier: GPL-3.0-only
//! Register bus access

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// 32-bit register access to one GPU
///
/// Each call is a single atomic access; there are no partial writes.
pub trait RegisterBus: std::fmt::Debug + Send + Sync {
    /// Read the register at `addr`
    fn rd32(&self, addr: u32) -> u32;

    /// Write `value` to the register at `addr`
    fn wr32(&self, addr: u32, value: u32);

    /// Read-modify-write: clear `mask`, then OR in `value`
    ///
    /// Not atomic with respect to other users of the bus; callers serialize.
    fn mask(&self, addr: u32, mask: u32, value: u32) -> u32 {
        let old = self.rd32(addr);
        self.wr32(addr, (old & !mask) | value);
        old
    }
}

/// Register file kept in memory
///
/// Unset registers read as zero. Used by the demo binary and the tests in
/// place of a real MMIO mapping.
#[derive(Debug, Default)]
pub struct MemoryRegisterBus {
    regs: Mutex<HashMap<u32, u32>>,
}

impl MemoryRegisterBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bus preloaded with `(addr, value)` pairs
    pub fn with_registers(regs: impl IntoIterator<Item = (u32, u32)>) -> Self {
        Self {
            regs: Mutex::new(regs.into_iter().collect()),
        }
    }
}

impl RegisterBus for MemoryRegisterBus {
    fn rd32(&self, addr: u32) -> u32 {
        let regs = self.regs.lock().unwrap_or_else(PoisonError::into_inner);
        regs.get(&addr).copied().unwrap_or(0)
    }

    fn wr32(&self, addr: u32, value: u32) {
        let mut regs = self.regs.lock().unwrap_or_else(PoisonError::into_inner);
        regs.insert(addr, value);
    }
}
