// SPDX-License-Identifier: GPL-3.0-only
//! In-memory backlight class
//!
//! Keeps registered devices in a map keyed by name, the way the OS class
//! exposes them under one directory. Names are unique: a second device under
//! a live name is refused.
//!
//! # Usage
//!
//! ```no_run
//! use nv_backlight::backlight::MemoryBacklightService;
//!
//! let service = MemoryBacklightService::new();
//! if let Some(device) = service.get("nv_backlight") {
//!     device.set_brightness(50).unwrap();
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::backend::{
    BacklightDevice, BacklightHandle, BacklightOps, BacklightProperties, BacklightService,
};
use crate::error::BacklightError;

#[derive(Debug, Default)]
pub struct MemoryBacklightService {
    devices: Mutex<BTreeMap<String, BacklightHandle>>,
}

impl MemoryBacklightService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a registered device by name
    pub fn get(&self, name: &str) -> Option<BacklightHandle> {
        self.devices().get(name).cloned()
    }

    /// Names of all registered devices, sorted
    pub fn names(&self) -> Vec<String> {
        self.devices().keys().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.devices().len()
    }

    /// Mark devices suspended and let their drivers react
    ///
    /// Only devices whose ops ask the core to handle suspend are touched.
    /// Returns the number of devices that failed to update.
    pub fn suspend(&self) -> usize {
        self.set_suspended(true)
    }

    /// Clear the suspended state and re-apply every stored level
    pub fn resume(&self) -> usize {
        self.set_suspended(false)
    }

    fn set_suspended(&self, suspended: bool) -> usize {
        let devices: Vec<_> = self.devices().values().cloned().collect();
        let mut failed = 0;
        for device in devices.iter().filter(|d| d.core_suspend_resume()) {
            if let Err(e) = device.set_suspended(suspended) {
                warn!(
                    device = device.name(),
                    suspended, "backlight update failed: {}", e
                );
                failed += 1;
            }
        }
        failed
    }

    fn devices(&self) -> MutexGuard<'_, BTreeMap<String, BacklightHandle>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BacklightService for MemoryBacklightService {
    fn register(
        &self,
        name: &str,
        parent: Option<&str>,
        ops: BacklightOps,
        props: BacklightProperties,
    ) -> anyhow::Result<BacklightHandle> {
        let mut devices = self.devices();
        if devices.contains_key(name) {
            return Err(BacklightError::DuplicateName(name.to_string()).into());
        }

        let device = Arc::new(BacklightDevice::new(
            name,
            parent.map(str::to_string),
            ops,
            props,
        ));
        devices.insert(name.to_string(), Arc::clone(&device));
        debug!(device = name, parent, "backlight device registered");
        Ok(device)
    }

    fn unregister(&self, handle: &BacklightHandle) {
        let mut devices = self.devices();
        match devices.get(handle.name()) {
            Some(existing) if Arc::ptr_eq(existing, handle) => {
                devices.remove(handle.name());
                debug!(device = handle.name(), "backlight device unregistered");
            }
            _ => warn!(
                device = handle.name(),
                "unregister of a device that is not registered"
            ),
        }
    }
}
