// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operating state of the appliance.

use crate::telemetry::DeviceReport;
use crate::types::FanSpeed;

/// Last known operating state of the appliance.
///
/// All fields are optional because nothing is known until the appliance
/// answers its first poll. Values are merged field by field from each
/// [`DeviceReport`], so a field the appliance omits keeps its previous value.
///
/// # Examples
///
/// ```
/// use venta_vdc::state::ApplianceState;
/// use venta_vdc::telemetry::DeviceReport;
///
/// let mut state = ApplianceState::new();
/// state.merge(&DeviceReport { fan: Some(2), sleep_mode: Some(true), ..Default::default() });
/// state.merge(&DeviceReport { humidity: Some(40), ..Default::default() });
///
/// assert_eq!(state.fan(), Some(2));
/// assert_eq!(state.sleep_mode(), Some(true));
/// assert_eq!(state.current_humidity(), Some(40));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplianceState {
    current_humidity: Option<i64>,
    current_temperature: Option<i64>,
    target_humidity: Option<i64>,
    fan: Option<i64>,
    sleep_mode: Option<bool>,
    auto_mode: Option<bool>,
}

impl ApplianceState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the measured humidity in percent.
    #[must_use]
    pub fn current_humidity(&self) -> Option<i64> {
        self.current_humidity
    }

    /// Returns the measured temperature.
    #[must_use]
    pub fn current_temperature(&self) -> Option<i64> {
        self.current_temperature
    }

    /// Returns the humidity the appliance tries to reach.
    #[must_use]
    pub fn target_humidity(&self) -> Option<i64> {
        self.target_humidity
    }

    /// Returns the raw fan level as reported.
    #[must_use]
    pub fn fan(&self) -> Option<i64> {
        self.fan
    }

    /// Returns the fan level if it is one of the three valid speeds.
    #[must_use]
    pub fn fan_speed(&self) -> Option<FanSpeed> {
        self.fan.and_then(|f| FanSpeed::try_from(f).ok())
    }

    /// Returns whether sleep mode is on.
    #[must_use]
    pub fn sleep_mode(&self) -> Option<bool> {
        self.sleep_mode
    }

    /// Returns whether automatic mode is on.
    #[must_use]
    pub fn auto_mode(&self) -> Option<bool> {
        self.auto_mode
    }

    /// Merges a report into the state.
    ///
    /// Fields missing from the report are left untouched. Returns `true` if
    /// any stored field changed.
    pub fn merge(&mut self, report: &DeviceReport) -> bool {
        let before = *self;
        merge_field(&mut self.current_humidity, report.humidity);
        merge_field(&mut self.current_temperature, report.temperature);
        merge_field(&mut self.target_humidity, report.target_humidity);
        merge_field(&mut self.fan, report.fan);
        merge_field(&mut self.sleep_mode, report.sleep_mode);
        merge_field(&mut self.auto_mode, report.auto_mode);
        *self != before
    }
}

fn merge_field<T>(slot: &mut Option<T>, update: Option<T>) {
    if update.is_some() {
        *slot = update;
    }
}
