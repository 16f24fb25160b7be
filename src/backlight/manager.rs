// SPDX-License-Identifier: GPL-3.0-only
//! Backlight lifecycle
//!
//! [`BacklightModule`] is the process-wide state: the identity pool shared by
//! every GPU. It is created once when the driver loads ([`BacklightModule::ctor`])
//! and emptied when it unloads ([`BacklightModule::dtor`]).
//!
//! [`BacklightManager`] is the per-GPU part. `init` registers at most one
//! backlight device and `exit` tears everything down again. Callers serialize
//! `init` and `exit` on a given manager.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use nv_backlight::backlight::{BacklightManager, BacklightModule, MemoryBacklightService};
//! use nv_backlight::gpu::{GpuDevice, StaticProbe};
//!
//! # fn example(gpu: GpuDevice) -> nv_backlight::Result<()> {
//! let module = BacklightModule::ctor();
//! let service = Arc::new(MemoryBacklightService::new());
//! let mut backlight = BacklightManager::new(&module, service, Arc::new(StaticProbe::default()));
//!
//! backlight.init(&gpu)?;
//! backlight.exit();
//! module.dtor();
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use super::backend::{BacklightHandle, BacklightService};
use super::enumeration::{self, InitOutcome, Scan};
use crate::error::Result;
use crate::gpu::{GpuDevice, PlatformProbe};
use crate::identity::{BacklightConnector, IdentityAllocator};

/// Process-wide backlight state
#[derive(Debug, Default)]
pub struct BacklightModule {
    ida: Arc<IdentityAllocator>,
}

impl BacklightModule {
    /// Set up the identity pool
    pub fn ctor() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Release the identity pool
    pub fn dtor(&self) {
        self.ida.destroy();
    }

    pub fn identities(&self) -> &Arc<IdentityAllocator> {
        &self.ida
    }
}

/// Backlight state of one GPU driver instance
#[derive(Debug)]
pub struct BacklightManager {
    ida: Arc<IdentityAllocator>,
    service: Arc<dyn BacklightService>,
    platform: Arc<dyn PlatformProbe>,
    connectors: Vec<BacklightConnector>,
    backlight: Option<BacklightHandle>,
}

impl BacklightManager {
    pub fn new(
        module: &BacklightModule,
        service: Arc<dyn BacklightService>,
        platform: Arc<dyn PlatformProbe>,
    ) -> Self {
        Self {
            ida: Arc::clone(&module.ida),
            service,
            platform,
            connectors: Vec::new(),
            backlight: None,
        }
    }

    /// Register the backlight of `gpu`, if it has one
    ///
    /// Hardware without a usable backlight is reported through the
    /// returned [`InitOutcome`], not as an error.
    pub fn init(&mut self, gpu: &GpuDevice) -> Result<InitOutcome> {
        if !self.connectors.is_empty() || self.backlight.is_some() {
            warn!("backlight init on a live manager, tearing down the previous device");
            self.exit();
        }

        if self.platform.competing_controller_present() {
            info!("Apple GMUX detected: not registering GPU backlight interface");
            return Ok(InitOutcome::CompetingController);
        }

        let (connector, codec) = match enumeration::scan(gpu)? {
            Scan::Found { connector, codec } => (connector, codec),
            Scan::Done(outcome) => return Ok(outcome),
        };

        let Some(registration) =
            enumeration::register(&self.ida, self.service.as_ref(), gpu, connector, codec)?
        else {
            return Ok(InitOutcome::NoIdentity);
        };

        let handle = registration.handle;
        self.connectors.push(registration.record);
        self.backlight = Some(Arc::clone(&handle));

        let brightness = handle.sync_from_hardware();
        debug!(device = handle.name(), brightness, "initial backlight level");
        if let Err(e) = self.service.update_status(&handle) {
            warn!(device = handle.name(), "failed to apply initial brightness: {}", e);
        }

        Ok(InitOutcome::Registered {
            name: handle.name().to_string(),
        })
    }

    /// Release every name and unregister the device
    ///
    /// Safe to call when `init` registered nothing, and more than once.
    pub fn exit(&mut self) {
        for connector in self.connectors.drain(..) {
            debug!(id = %connector.id(), "releasing backlight connector");
        }

        if let Some(backlight) = self.backlight.take() {
            info!(device = backlight.name(), "unregistering backlight");
            self.service.unregister(&backlight);
        }
    }

    /// The active backlight device
    pub fn backlight(&self) -> Option<&BacklightHandle> {
        self.backlight.as_ref()
    }

    /// Number of live backlight connector records
    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }
}

impl Drop for BacklightManager {
    fn drop(&mut self) {
        self.exit();
    }
}
