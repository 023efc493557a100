// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seam between the bridge and a VDC-API transport.
//!
//! A transport owns the connection to the bus controller. It delivers
//! incoming requests as [`BusEvent`]s over a channel and offers the
//! outgoing primitives of [`BusTransport`]. Requests that need an answer
//! carry a [`oneshot`] sender for the reply.

mod tracing_transport;

pub use tracing_transport::TracingTransport;

use tokio::sync::oneshot;

use crate::bridge::{PropertyEntry, PropertyObject, QueryItem, ResultCode};
use crate::error::BusError;
use crate::types::DsUid;

/// Outgoing calls to the bus controller.
///
/// Calls are short, local operations and never wait for the controller's
/// answer.
pub trait BusTransport: Send + Sync {
    /// Returns `true` while a session with the controller exists.
    fn has_session(&self) -> bool;

    /// Announces the vDC container.
    ///
    /// # Errors
    ///
    /// Returns `BusError` if the transport refuses the call.
    fn announce_container(&self, vdc: &DsUid) -> Result<(), BusError>;

    /// Announces the device as a member of the container.
    ///
    /// # Errors
    ///
    /// Returns `BusError` if the transport refuses the call.
    fn announce_device(&self, vdc: &DsUid, device: &DsUid) -> Result<(), BusError>;

    /// Reports the device as present.
    ///
    /// # Errors
    ///
    /// Returns `BusError` if the transport refuses the call.
    fn identify_device(&self, device: &DsUid) -> Result<(), BusError>;

    /// Reports the device as gone.
    ///
    /// # Errors
    ///
    /// Returns `BusError` if the transport refuses the call.
    fn device_vanished(&self, device: &DsUid) -> Result<(), BusError>;

    /// Sends a liveness answer for `dsuid`.
    ///
    /// # Errors
    ///
    /// Returns `BusError` if the transport refuses the call.
    fn send_pong(&self, dsuid: &DsUid) -> Result<(), BusError>;

    /// Pushes unsolicited property values for `device`.
    ///
    /// # Errors
    ///
    /// Returns `BusError` if the transport refuses the call.
    fn push_property(&self, device: &DsUid, properties: PropertyObject) -> Result<(), BusError>;
}

/// Request or notification from the bus controller.
#[derive(Debug)]
pub enum BusEvent {
    /// A session was opened.
    NewSession,
    /// The session ended.
    EndSession,
    /// Liveness probe for one of the bridge's dSUIDs.
    Ping {
        /// Probed dSUID.
        dsuid: String,
    },
    /// Property read.
    GetProperty {
        /// Addressed dSUID.
        dsuid: String,
        /// Requested names.
        query: Vec<QueryItem>,
        /// Receives the answer, `None` if the request was dropped.
        reply: oneshot::Sender<Option<PropertyObject>>,
    },
    /// Property write.
    SetProperty {
        /// Addressed dSUID.
        dsuid: String,
        /// Names and new values.
        entries: Vec<PropertyEntry>,
        /// Receives the result, `None` if the request was dropped.
        reply: oneshot::Sender<Option<ResultCode>>,
    },
    /// Scene invocation.
    CallScene {
        /// Addressed dSUIDs.
        dsuids: Vec<String>,
        /// Scene number.
        scene: i32,
        /// Apply even if the scene is locally considered active.
        force: bool,
    },
    /// Scene save.
    SaveScene {
        /// Addressed dSUIDs.
        dsuids: Vec<String>,
        /// Scene number.
        scene: i32,
    },
    /// Identify request (blink).
    Identify {
        /// Addressed dSUID.
        dsuid: String,
    },
    /// Device removal.
    Remove {
        /// Addressed dSUID.
        dsuid: String,
        /// Receives whether removal is accepted.
        reply: oneshot::Sender<bool>,
    },
    /// Generic method call.
    GenericRequest {
        /// Addressed dSUID.
        dsuid: String,
        /// Method name.
        method: String,
        /// Parameters.
        params: Vec<PropertyEntry>,
        /// Receives the result.
        reply: oneshot::Sender<ResultCode>,
    },
}
