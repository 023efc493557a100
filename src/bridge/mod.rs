// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Projection of the bridge state onto bus properties.
//!
//! [`PropertyBridge`] answers get-property and set-property requests. Each
//! property name maps to a handler with a reader and an optional writer.
//! The tables are built once, unknown names fall through to a warning.
//!
//! # Examples
//!
//! ```
//! use venta_vdc::bridge::{PropertyBridge, PropertyValue, QueryItem};
//! use venta_vdc::config::Settings;
//! use venta_vdc::context::{BridgeContext, BridgeState, Identity};
//! use venta_vdc::profile::DeviceProfile;
//! use venta_vdc::types::DsUid;
//!
//! let profile = DeviceProfile::new("VENTA-1", "Bedroom", "192.168.1.50");
//! let identity = Identity::new(
//!     DsUid::random(),
//!     DsUid::random(),
//!     DsUid::for_device("VENTA-1"),
//!     "pi",
//! );
//! let device = identity.device().clone();
//! let ctx = BridgeContext::new(BridgeState::new(profile, Settings::default()), identity);
//!
//! let bridge = PropertyBridge::new();
//! let reply = bridge
//!     .get(&ctx, device.as_str(), &[QueryItem::named("primaryGroup")], chrono::Utc::now())
//!     .unwrap();
//! assert_eq!(reply.get("primaryGroup"), Some(&PropertyValue::Uint(8)));
//! ```

mod handlers;
mod value;

pub use handlers::{ICON_NAME, PRODUCT_NAME};
pub use value::{PropertyEntry, PropertyObject, PropertyValue, QueryItem, ResultCode};

use chrono::{DateTime, Utc};

use crate::context::{BridgeContext, BridgeState, Target};
use handlers::{HandlerTable, ReadContext};

/// Answers bus property requests.
#[derive(Debug)]
pub struct PropertyBridge {
    container: HandlerTable,
    device: HandlerTable,
}

impl PropertyBridge {
    /// Builds the handler tables.
    #[must_use]
    pub fn new() -> Self {
        Self {
            container: handlers::container_handlers(),
            device: handlers::device_handlers(),
        }
    }

    fn table(&self, target: Target) -> &HandlerTable {
        match target {
            Target::Container => &self.container,
            Target::Device => &self.device,
        }
    }

    /// Returns `true` if `name` is a known property of `target`.
    #[must_use]
    pub fn handles(&self, target: Target, name: &str) -> bool {
        self.table(target).contains_key(name)
    }

    /// Resolves a get-property request.
    ///
    /// Returns `None` if `dsuid` is none of the bridge's identities; the
    /// request is then dropped. Otherwise every resolvable name in `query`
    /// is answered. Wildcards and unknown names are skipped with a warning
    /// and never fail the whole request.
    #[must_use]
    pub fn get(
        &self,
        ctx: &BridgeContext,
        dsuid: &str,
        query: &[QueryItem],
        now: DateTime<Utc>,
    ) -> Option<PropertyObject> {
        let Some(target) = ctx.identity().target(dsuid) else {
            tracing::warn!(dsuid, "get property: unhandled dSUID");
            return None;
        };
        let table = self.table(target);
        let state = ctx.lock();

        let mut reply = PropertyObject::new();
        for item in query {
            let Some(name) = item.name.as_deref() else {
                tracing::warn!(?target, "get property: wildcard queries are not handled");
                continue;
            };
            tracing::debug!(?target, name, "get property");
            let Some(handler) = table.get(name) else {
                tracing::warn!(?target, name, "get property: unhandled name");
                continue;
            };
            let read_ctx = ReadContext {
                state: &state,
                identity: ctx.identity(),
                query: item,
                now,
            };
            if let Some(value) = (handler.read)(&read_ctx) {
                reply.push(name, value);
            }
        }
        Some(reply)
    }

    /// Applies a set-property request.
    ///
    /// Entries are applied in order until one fails. A successful request is
    /// persisted to the configuration store. Returns `None` if `dsuid` is
    /// none of the bridge's identities.
    #[must_use]
    pub fn set(
        &self,
        ctx: &BridgeContext,
        dsuid: &str,
        entries: &[PropertyEntry],
    ) -> Option<ResultCode> {
        let Some(target) = ctx.identity().target(dsuid) else {
            tracing::warn!(dsuid, "set property: unhandled dSUID");
            return None;
        };
        if entries.is_empty() {
            return Some(ResultCode::MissingData);
        }
        let table = self.table(target);

        let mut code = ResultCode::Ok;
        {
            let mut state = ctx.lock();
            for entry in entries {
                let Some(name) = entry.name.as_deref() else {
                    tracing::error!(?target, "set property: wildcard properties are not handled");
                    code = ResultCode::NotImplemented;
                    break;
                };
                let Some(write) = table.get(name).and_then(|h| h.write) else {
                    tracing::warn!(?target, name, "set property: not writable");
                    code = ResultCode::NotFound;
                    break;
                };
                code = write(&mut state, &entry.value);
                if code == ResultCode::Ok {
                    tracing::info!(?target, name, value = ?entry.value, "set property");
                } else {
                    tracing::error!(?target, name, %code, "set property: rejected value");
                    break;
                }
            }
        }

        if code == ResultCode::Ok {
            if let Err(e) = ctx.persist() {
                tracing::error!(error = %e, "Could not write configuration");
            }
        }
        Some(code)
    }

    /// Builds the unsolicited state report for the device and marks every
    /// reported sensor with `now`.
    ///
    /// The payload carries `sensorStates` for all active sensors and a
    /// `deviceStates` entry flagging the appliance as connected.
    pub fn push_payload(&self, state: &mut BridgeState, now: DateTime<Utc>) -> PropertyObject {
        let sensor_states = handlers::sensor_states(state, now, None);
        for (_, sensor) in state.profile.active_sensors_mut() {
            sensor.reading_mut().mark_reported(now);
        }

        let connected = PropertyObject::new()
            .with("name", "connected")
            .with("value", "1");
        PropertyObject::new()
            .with("sensorStates", sensor_states)
            .with("deviceStates", PropertyObject::new().with("0", connected))
    }
}

impl Default for PropertyBridge {
    fn default() -> Self {
        Self::new()
    }
}
