// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared state of a running bridge.
//!
//! The poller, the bus event loop and the request handlers all work on one
//! [`BridgeContext`]. Everything mutable sits behind a single
//! [`parking_lot::Mutex`]. Holders never keep the guard across an `.await`
//! or an HTTP request. The event loop only uses [`BridgeContext::try_lock`]
//! and retries on its next tick when the lock is taken.

use parking_lot::{Mutex, MutexGuard};

use crate::config::{ConfigFile, ConfigStore, Settings};
use crate::error::ConfigError;
use crate::profile::DeviceProfile;
use crate::state::ApplianceState;
use crate::types::DsUid;

/// Which of the bridge's identities a bus request is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The vDC container (vDC or library dSUID).
    Container,
    /// The humidifier device.
    Device,
}

/// Identifiers the bridge answers to on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    vdc: DsUid,
    library: DsUid,
    device: DsUid,
    hostname: String,
}

impl Identity {
    /// Creates an identity.
    #[must_use]
    pub fn new(vdc: DsUid, library: DsUid, device: DsUid, hostname: impl Into<String>) -> Self {
        Self {
            vdc,
            library,
            device,
            hostname: hostname.into(),
        }
    }

    /// Returns the dSUID of the vDC container.
    #[must_use]
    pub fn vdc(&self) -> &DsUid {
        &self.vdc
    }

    /// Returns the dSUID of the library instance.
    #[must_use]
    pub fn library(&self) -> &DsUid {
        &self.library
    }

    /// Returns the dSUID of the humidifier.
    #[must_use]
    pub fn device(&self) -> &DsUid {
        &self.device
    }

    /// Returns the host name the bridge runs on.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Returns the name announced for the service.
    #[must_use]
    pub fn service_name(&self) -> String {
        format!("Venta humifier Controller @{}", self.hostname)
    }

    /// Returns the own dSUID equal to `dsuid`, ignoring case.
    #[must_use]
    pub fn resolve(&self, dsuid: &str) -> Option<&DsUid> {
        [&self.vdc, &self.library, &self.device]
            .into_iter()
            .find(|own| own.matches(dsuid))
    }

    /// Resolves a dSUID from a bus request, ignoring case.
    #[must_use]
    pub fn target(&self, dsuid: &str) -> Option<Target> {
        if self.vdc.matches(dsuid) || self.library.matches(dsuid) {
            Some(Target::Container)
        } else if self.device.matches(dsuid) {
            Some(Target::Device)
        } else {
            None
        }
    }
}

/// Announcement state of the device on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presence {
    /// The device was announced in the current session.
    pub announced: bool,
    /// The appliance is considered present.
    pub present: bool,
    /// The bus has been told about the current `present` value.
    pub present_signaled: bool,
}

impl Default for Presence {
    fn default() -> Self {
        Self {
            announced: false,
            present: true,
            present_signaled: false,
        }
    }
}

/// Everything guarded by the bridge lock.
#[derive(Debug, Clone)]
pub struct BridgeState {
    /// Appliance description, sensor readings and scenes.
    pub profile: DeviceProfile,
    /// Last known operating state.
    pub appliance: ApplianceState,
    /// Fresh readings are waiting to be pushed to the bus.
    pub dirty: bool,
    /// Runtime settings.
    pub settings: Settings,
    /// Announcement state.
    pub presence: Presence,
}

impl BridgeState {
    /// Creates the initial state for a freshly loaded profile.
    #[must_use]
    pub fn new(profile: DeviceProfile, settings: Settings) -> Self {
        Self {
            profile,
            appliance: ApplianceState::new(),
            dirty: false,
            settings,
            presence: Presence::default(),
        }
    }
}

/// Lock-guarded state plus the immutable identity of the bridge.
///
/// Shared between tasks as `Arc<BridgeContext>`.
#[derive(Debug)]
pub struct BridgeContext {
    state: Mutex<BridgeState>,
    identity: Identity,
    store: Option<ConfigStore>,
}

impl BridgeContext {
    /// Creates a context that does not persist changes.
    #[must_use]
    pub fn new(state: BridgeState, identity: Identity) -> Self {
        Self {
            state: Mutex::new(state),
            identity,
            store: None,
        }
    }

    /// Persists changes to `store`.
    #[must_use]
    pub fn with_store(mut self, store: ConfigStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Returns the bus identity.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Waits for the lock.
    pub fn lock(&self) -> MutexGuard<'_, BridgeState> {
        self.state.lock()
    }

    /// Takes the lock if it is free.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, BridgeState>> {
        self.state.try_lock()
    }

    /// Writes the current profile and settings to the configuration store.
    ///
    /// The file contents are built under the lock, the write happens after
    /// it is released. Without a store this does nothing.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the file cannot be written.
    pub fn persist(&self) -> Result<(), ConfigError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let file = {
            let state = self.lock();
            ConfigFile::from_parts(
                &state.profile,
                &state.settings,
                self.identity.vdc(),
                self.identity.library(),
            )
        };
        store.save(&file)
    }
}
