// SPDX-License-Identifier: GPL-3.0-only
//! Backlight device naming
//!
//! Every registered backlight gets a small integer from a process-wide pool.
//! The integer only feeds the device name: id 0 is `nv_backlight`, id N is
//! `nv_backlightN`. The pool is bounded to 0..100 so the name always fits
//! the base name plus two digits.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{BacklightError, Result};

/// Base name of every backlight device
pub const BL_NAME: &str = "nv_backlight";

/// Name buffer size: 12 for the base name, 2 for digits, 1 for the terminator
pub const BL_NAME_SIZE: usize = 15;

/// Ids are handed out from 0..MAX_BACKLIGHT_IDS
pub const MAX_BACKLIGHT_IDS: u32 = 100;

/// Identity of a live backlight device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BacklightId(u32);

impl BacklightId {
    pub fn get(self) -> u32 {
        self.0
    }

    /// Device name for this identity
    pub fn name(self) -> Option<String> {
        backlight_name(self.0)
    }
}

impl fmt::Display for BacklightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build the device name for `id`
///
/// Returns `None` when `id` would not fit in [`BL_NAME_SIZE`].
pub fn backlight_name(id: u32) -> Option<String> {
    if id >= MAX_BACKLIGHT_IDS {
        return None;
    }
    let name = if id > 0 {
        format!("{BL_NAME}{id}")
    } else {
        BL_NAME.to_string()
    };
    debug_assert!(name.len() < BL_NAME_SIZE);
    Some(name)
}

/// Bounded pool of backlight identities
///
/// Allocation and release are serialized by an internal lock, so several GPU
/// driver instances may share one pool.
#[derive(Debug, Default)]
pub struct IdentityAllocator {
    pool: Mutex<Pool>,
}

#[derive(Debug, Default)]
struct Pool {
    used: BTreeSet<u32>,
    /// Bumped by `destroy`; ids from an older generation are never released
    generation: u64,
}

impl IdentityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Pool> {
        self.pool.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the smallest free id
    pub fn allocate(&self) -> Result<BacklightId> {
        self.allocate_tagged().map(|(id, _)| id)
    }

    fn allocate_tagged(&self) -> Result<(BacklightId, u64)> {
        let mut pool = self.lock();
        let id = (0..MAX_BACKLIGHT_IDS)
            .find(|id| !pool.used.contains(id))
            .ok_or(BacklightError::IdentityExhausted)?;
        pool.used.insert(id);
        Ok((BacklightId(id), pool.generation))
    }

    /// Return an id to the pool
    ///
    /// Id 0 is never returned: it stays marked as used once handed out, so a
    /// later device on any GPU is named with a numeric suffix.
    pub fn release(&self, id: BacklightId) {
        let mut pool = self.lock();
        Self::release_locked(&mut pool, id);
    }

    fn release_from(&self, id: BacklightId, generation: u64) {
        let mut pool = self.lock();
        if pool.generation != generation {
            debug!(%id, "ignoring release of an id from before pool teardown");
            return;
        }
        Self::release_locked(&mut pool, id);
    }

    fn release_locked(pool: &mut Pool, id: BacklightId) {
        if id.0 != 0 {
            pool.used.remove(&id.0);
        }
    }

    /// Number of ids currently marked as used
    pub fn in_use(&self) -> usize {
        self.lock().used.len()
    }

    /// Drop every allocation, including id 0
    ///
    /// Records allocated before this call no longer give their id back, so
    /// they cannot free an id handed out afterwards.
    pub fn destroy(&self) {
        let mut pool = self.lock();
        if !pool.used.is_empty() {
            debug!(in_use = pool.used.len(), "destroying identity pool");
        }
        pool.used.clear();
        pool.generation += 1;
    }
}

/// A registered backlight's claim on its identity
///
/// Dropping the record gives the id back to the pool, unless the pool was
/// destroyed since the id was handed out.
#[derive(Debug)]
pub struct BacklightConnector {
    id: BacklightId,
    generation: u64,
    ida: Arc<IdentityAllocator>,
}

impl BacklightConnector {
    /// Allocate an id and derive its name
    pub fn allocate(ida: &Arc<IdentityAllocator>) -> Result<(Self, String)> {
        let (id, generation) = ida.allocate_tagged()?;
        let record = Self {
            id,
            generation,
            ida: Arc::clone(ida),
        };
        let name = id.name().ok_or(BacklightError::IdentityExhausted)?;
        Ok((record, name))
    }

    pub fn id(&self) -> BacklightId {
        self.id
    }
}

impl Drop for BacklightConnector {
    fn drop(&mut self) {
        self.ida.release_from(self.id, self.generation);
    }
}
