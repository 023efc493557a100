// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Venta VDC - bridge between a Venta network humidifier and a
//! digitalSTROM VDC-API bus controller.
//!
//! The humidifier exposes a small HTTP API: one endpoint returning its
//! readings and one accepting front panel button presses. This crate polls
//! the readings, publishes them as bus sensors and turns bus scene calls
//! into the button presses that reach the requested fan, sleep and
//! automatic mode settings.
//!
//! # Components
//!
//! - [`appliance::ApplianceClient`] - HTTP access to the humidifier
//! - [`sync::StateSynchronizer`] - periodic polling task
//! - [`bridge::PropertyBridge`] - bus property reads and writes
//! - [`scene::SceneEngine`] - scene invocation and saving
//! - [`host::VdcHost`] - protocol loop driving announcement and pushes
//! - [`config::ConfigStore`] - TOML configuration with atomic writes
//!
//! All mutable state lives in one [`context::BridgeContext`] shared by the
//! tasks. The bus itself is reached through the [`bus::BusTransport`]
//! trait.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tokio::sync::{mpsc, watch};
//! use venta_vdc::appliance::ApplianceClient;
//! use venta_vdc::bus::TracingTransport;
//! use venta_vdc::config::Settings;
//! use venta_vdc::context::{BridgeContext, BridgeState, Identity};
//! use venta_vdc::host::VdcHost;
//! use venta_vdc::profile::DeviceProfile;
//! use venta_vdc::protocol::HttpConfig;
//! use venta_vdc::sync::StateSynchronizer;
//! use venta_vdc::types::DsUid;
//!
//! #[tokio::main]
//! async fn main() -> venta_vdc::Result<()> {
//!     let profile = DeviceProfile::new("VENTA-1", "Bedroom", "192.168.1.50");
//!     let identity = Identity::new(
//!         DsUid::random(),
//!         DsUid::random(),
//!         DsUid::for_device(profile.id()),
//!         "pi",
//!     );
//!     let client = ApplianceClient::new(HttpConfig::new(profile.address()))?;
//!     let ctx = Arc::new(BridgeContext::new(
//!         BridgeState::new(profile, Settings::default()),
//!         identity,
//!     ));
//!     let transport = Arc::new(TracingTransport::new());
//!     let (_events_tx, events_rx) = mpsc::channel(16);
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//!     let poller = StateSynchronizer::new(client.clone(), ctx.clone(), transport.clone());
//!     tokio::spawn(poller.run(shutdown_rx.clone()));
//!     VdcHost::new(ctx, transport, client, events_rx).run(shutdown_rx).await;
//!     Ok(())
//! }
//! ```

pub mod appliance;
pub mod bridge;
pub mod bus;
pub mod config;
pub mod context;
pub mod error;
pub mod host;
pub mod profile;
pub mod protocol;
pub mod scene;
pub mod state;
pub mod sync;
pub mod telemetry;
pub mod types;

pub use error::{
    BusError, ConfigError, Error, ErrorKind, ParseError, ProtocolError, Result, ValueError,
};
