// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensors exposed to the bus and their latest readings.

use chrono::{DateTime, Utc};

use crate::types::SensorKind;

/// A named measurement the appliance reports.
///
/// The name is matched case-insensitively against keys of the appliance's
/// `/api/data` document.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    name: String,
    kind: SensorKind,
    usage: u32,
    active: bool,
    reading: SensorReading,
}

impl Sensor {
    /// Creates an active sensor with an empty reading.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: SensorKind, usage: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            usage,
            active: true,
            reading: SensorReading::default(),
        }
    }

    /// Marks the sensor active or inactive.
    ///
    /// Inactive sensors keep their slot index but are skipped by every read.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Returns the sensor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the bus sensor type.
    #[must_use]
    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Returns the bus sensor usage tag.
    #[must_use]
    pub fn usage(&self) -> u32 {
        self.usage
    }

    /// Returns whether the sensor is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the latest reading.
    #[must_use]
    pub fn reading(&self) -> &SensorReading {
        &self.reading
    }

    pub(crate) fn reading_mut(&mut self) -> &mut SensorReading {
        &mut self.reading
    }

    /// Returns `true` if `key` names this sensor, ignoring case.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.name.eq_ignore_ascii_case(key)
    }
}

/// The last two values observed for a sensor.
///
/// Booleans are stored as `0.0` / `1.0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorReading {
    value: f64,
    previous_value: f64,
    last_queried: Option<DateTime<Utc>>,
    last_reported: Option<DateTime<Utc>>,
}

impl SensorReading {
    /// Returns the current value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns the value seen before the current one.
    #[must_use]
    pub fn previous_value(&self) -> f64 {
        self.previous_value
    }

    /// Returns when the value was last read from the appliance.
    #[must_use]
    pub fn last_queried(&self) -> Option<DateTime<Utc>> {
        self.last_queried
    }

    /// Returns when the value was last pushed to the bus.
    #[must_use]
    pub fn last_reported(&self) -> Option<DateTime<Utc>> {
        self.last_reported
    }

    /// Stores a freshly polled value.
    ///
    /// Returns `true` if the value differs from the stored one or the sensor
    /// was never queried before.
    pub fn record(&mut self, value: f64, now: DateTime<Utc>) -> bool {
        #[allow(clippy::float_cmp)]
        let changed = self.last_queried.is_none() || self.value != value;
        self.previous_value = self.value;
        self.value = value;
        self.last_queried = Some(now);
        changed
    }

    /// Notes that the value was pushed to the bus.
    pub fn mark_reported(&mut self, now: DateTime<Utc>) {
        self.last_reported = Some(now);
    }

    /// Returns the age of the value in whole seconds.
    ///
    /// A sensor that was never queried ages from `since`, normally the time
    /// the profile was loaded. The result is never negative.
    #[must_use]
    pub fn age_seconds(&self, now: DateTime<Utc>, since: DateTime<Utc>) -> i64 {
        let from = self.last_queried.unwrap_or(since);
        (now - from).num_seconds().max(0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn first_record_is_a_change() {
        let mut reading = SensorReading::default();
        assert!(reading.record(0.0, at(0)));
        assert_eq!(reading.last_queried(), Some(at(0)));
    }

    #[test]
    fn identical_value_is_not_a_change() {
        let mut reading = SensorReading::default();
        reading.record(45.0, at(0));
        assert!(!reading.record(45.0, at(60)));
        assert!(reading.record(46.0, at(120)));
        assert!((reading.previous_value() - 45.0).abs() < f64::EPSILON);
        assert!((reading.value() - 46.0).abs() < f64::EPSILON);
    }

    #[test]
    fn age_counts_from_last_query() {
        let mut reading = SensorReading::default();
        reading.record(21.0, at(10));
        assert_eq!(reading.age_seconds(at(70), at(0)), 60);
        assert_eq!(reading.age_seconds(at(100), at(0)), 90);
    }

    #[test]
    fn age_of_unqueried_sensor_counts_from_load() {
        let reading = SensorReading::default();
        assert_eq!(reading.age_seconds(at(30), at(0)), 30);
    }

    #[test]
    fn age_never_negative() {
        let mut reading = SensorReading::default();
        reading.record(1.0, at(100));
        assert_eq!(reading.age_seconds(at(100) - Duration::seconds(5), at(0)), 0);
    }

    #[test]
    fn sensor_name_match_ignores_case() {
        let sensor = Sensor::new("Hum", SensorKind::Humidity, 1);
        assert!(sensor.matches("hum"));
        assert!(sensor.matches("HUM"));
        assert!(!sensor.matches("humt"));
    }
}
