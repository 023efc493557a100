// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport that only logs.

use std::sync::atomic::{AtomicBool, Ordering};

use super::BusTransport;
use crate::bridge::PropertyObject;
use crate::error::BusError;
use crate::types::DsUid;

/// Loopback transport writing every outgoing call to the log.
///
/// Used when no VDC-API transport is linked in. The session is open from
/// the start and can be closed with [`close_session`](Self::close_session).
#[derive(Debug)]
pub struct TracingTransport {
    session: AtomicBool,
}

impl TracingTransport {
    /// Creates a transport with an open session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: AtomicBool::new(true),
        }
    }

    /// Marks the session as closed.
    pub fn close_session(&self) {
        self.session.store(false, Ordering::Relaxed);
    }
}

impl Default for TracingTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl BusTransport for TracingTransport {
    fn has_session(&self) -> bool {
        self.session.load(Ordering::Relaxed)
    }

    fn announce_container(&self, vdc: &DsUid) -> Result<(), BusError> {
        tracing::info!(%vdc, "announce container");
        Ok(())
    }

    fn announce_device(&self, vdc: &DsUid, device: &DsUid) -> Result<(), BusError> {
        tracing::info!(%vdc, %device, "announce device");
        Ok(())
    }

    fn identify_device(&self, device: &DsUid) -> Result<(), BusError> {
        tracing::info!(%device, "device present");
        Ok(())
    }

    fn device_vanished(&self, device: &DsUid) -> Result<(), BusError> {
        tracing::info!(%device, "device vanished");
        Ok(())
    }

    fn send_pong(&self, dsuid: &DsUid) -> Result<(), BusError> {
        tracing::debug!(%dsuid, "pong");
        Ok(())
    }

    fn push_property(&self, device: &DsUid, properties: PropertyObject) -> Result<(), BusError> {
        if !self.has_session() {
            return Err(BusError::NoSession);
        }
        tracing::info!(%device, ?properties, "push property");
        Ok(())
    }
}
