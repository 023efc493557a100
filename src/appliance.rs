// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client for the humidifier's HTTP API.
//!
//! [`ApplianceClient`] reads the data document and presses buttons. Reading
//! is split in two halves so that the network request never runs while the
//! bridge lock is held: [`ApplianceClient::fetch_report`] talks to the
//! appliance, [`apply_report`] folds the result into the shared state.

use chrono::{DateTime, Utc};

use crate::context::{BridgeContext, BridgeState};
use crate::error::{Error, ProtocolError};
use crate::protocol::{HttpClient, HttpConfig};
use crate::state::ApplianceState;
use crate::telemetry::DataReport;
use crate::types::Button;

/// Endpoint returning the current readings.
pub const DATA_PATH: &str = "/api/data";
/// Endpoint accepting button presses.
pub const BUTTON_PATH: &str = "/api/btn";

/// Result of one successful read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refresh {
    /// Operating state after the merge.
    pub state: ApplianceState,
    /// At least one configured sensor changed or was read for the first time.
    pub changed: bool,
}

/// Talks to one humidifier.
///
/// # Examples
///
/// ```no_run
/// use venta_vdc::appliance::ApplianceClient;
/// use venta_vdc::protocol::HttpConfig;
/// use venta_vdc::types::Button;
///
/// # async fn example() -> venta_vdc::Result<()> {
/// let client = ApplianceClient::new(HttpConfig::new("192.168.1.50"))?;
/// let report = client.fetch_report().await?;
/// println!("fan level {:?}", report.device().fan);
///
/// client.send_button(Button::ToggleSleep).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApplianceClient {
    http: HttpClient,
}

impl ApplianceClient {
    /// Creates a client from connection parameters.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the HTTP client cannot be built.
    pub fn new(config: HttpConfig) -> crate::Result<Self> {
        Ok(Self {
            http: config.into_client()?,
        })
    }

    /// Returns the base URL of the appliance.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Reads and decodes the data document.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the appliance cannot be reached or
    /// answers 403, 404, 503 or another non-success status, and
    /// `Error::Parse` for an undecodable body.
    pub async fn fetch_report(&self) -> crate::Result<DataReport> {
        let body = self.http.post(DATA_PATH, None).await?;
        Ok(DataReport::parse(&body)?)
    }

    /// Reads the appliance and merges the result into the shared state.
    ///
    /// The request runs without the lock. The merge takes the lock once.
    /// On failure nothing in `ctx` is touched.
    ///
    /// # Errors
    ///
    /// Same as [`fetch_report`](Self::fetch_report).
    pub async fn fetch_state(&self, ctx: &BridgeContext) -> crate::Result<Refresh> {
        let report = self.fetch_report().await?;
        let now = Utc::now();
        let mut state = ctx.lock();
        let changed = apply_report(&mut state, &report, now);
        Ok(Refresh {
            state: state.appliance,
            changed,
        })
    }

    /// Presses a front panel button.
    ///
    /// # Errors
    ///
    /// Returns `Error::CommandFailed` if the appliance cannot be reached
    /// or answers 403, 404 or 503. Any other response means the press was
    /// delivered.
    pub async fn send_button(&self, button: Button) -> crate::Result<()> {
        tracing::info!(%button, "Pressing appliance button");
        let body = serde_json::json!({ "btn": button.code() });
        match self.http.post(BUTTON_PATH, Some(&body)).await {
            Ok(_) => Ok(()),
            Err(ProtocolError::Status(status)) => {
                tracing::warn!(%button, status, "Button press answered with unexpected status");
                Ok(())
            }
            Err(source) => Err(Error::CommandFailed { button, source }),
        }
    }
}

/// Folds a decoded report into `state`.
///
/// The `device` fields are merged into the operating state field by field.
/// Every scalar is offered to the sensor with the same name. Keys without a
/// sensor are logged and skipped. Returns `true` if any sensor value changed
/// or was read for the first time.
pub fn apply_report(state: &mut BridgeState, report: &DataReport, now: DateTime<Utc>) -> bool {
    state.appliance.merge(report.device());

    let mut changed = false;
    for (key, value) in report.values() {
        match state.profile.record_reading(key, *value, now) {
            Some(sensor_changed) => {
                tracing::debug!(key = %key, value, changed = sensor_changed, "Sensor reading");
                changed |= sensor_changed;
            }
            None => {
                tracing::warn!(key = %key, "Value is not configured for evaluation, ignoring");
            }
        }
    }
    changed
}
