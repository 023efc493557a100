// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Description of the bridged appliance.
//!
//! A [`DeviceProfile`] holds the identity of the appliance, the sensors it
//! exposes to the bus and the scene table. It is loaded once from the
//! configuration file and then updated in place by the poller (sensor
//! readings) and by bus requests (zone, saved scenes).
//!
//! # Examples
//!
//! ```
//! use venta_vdc::profile::{DeviceProfile, Sensor};
//! use venta_vdc::types::SensorKind;
//!
//! let mut profile = DeviceProfile::new("VENTA-1", "Bedroom", "192.168.1.50");
//! profile.add_sensor(Sensor::new("hum", SensorKind::Humidity, 1)).unwrap();
//!
//! assert_eq!(profile.active_sensors().count(), 1);
//! ```

mod scene;
mod sensor;

pub use scene::{SaveOutcome, SceneSlot, SceneSpec, SceneTable};
pub use sensor::{Sensor, SensorReading};

use chrono::{DateTime, Utc};

use crate::error::ConfigError;

/// Zone used when neither the container nor the device has one configured.
pub const DEFAULT_ZONE_ID: u16 = 65534;

/// Static and mutable description of the appliance.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    id: String,
    name: String,
    address: String,
    zone_id: u16,
    sensors: Vec<Sensor>,
    sensor_capacity: usize,
    scenes: SceneTable,
    loaded_at: DateTime<Utc>,
}

impl DeviceProfile {
    /// Default number of sensor slots.
    pub const DEFAULT_SENSOR_CAPACITY: usize = 15;

    /// Creates a profile without sensors or scenes.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            zone_id: DEFAULT_ZONE_ID,
            sensors: Vec::new(),
            sensor_capacity: Self::DEFAULT_SENSOR_CAPACITY,
            scenes: SceneTable::new(),
            loaded_at: Utc::now(),
        }
    }

    /// Sets the device zone.
    #[must_use]
    pub fn with_zone_id(mut self, zone_id: u16) -> Self {
        self.zone_id = zone_id;
        self
    }

    /// Sets the time sensor ages are counted from before the first poll.
    #[must_use]
    pub fn with_loaded_at(mut self, loaded_at: DateTime<Utc>) -> Self {
        self.loaded_at = loaded_at;
        self
    }

    /// Returns the stable appliance identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the network address (host or IP) of the appliance.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the bus zone of the device.
    #[must_use]
    pub fn zone_id(&self) -> u16 {
        self.zone_id
    }

    /// Moves the device to another bus zone.
    pub fn set_zone_id(&mut self, zone_id: u16) {
        self.zone_id = zone_id;
    }

    /// Returns when the profile was loaded.
    #[must_use]
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    // ========== Sensors ==========

    /// Appends a sensor slot.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicateSensor` if a sensor with the same name
    /// (ignoring case) exists, or `ConfigError::InvalidValue` if all slots
    /// are taken.
    pub fn add_sensor(&mut self, sensor: Sensor) -> Result<(), ConfigError> {
        if self.sensors.len() >= self.sensor_capacity {
            return Err(ConfigError::InvalidValue {
                field: "sensor_values".to_string(),
                message: format!("at most {} sensors are supported", self.sensor_capacity),
            });
        }
        if self.sensors.iter().any(|s| s.matches(sensor.name())) {
            return Err(ConfigError::DuplicateSensor(sensor.name().to_string()));
        }
        self.sensors.push(sensor);
        Ok(())
    }

    /// Returns every sensor slot, including inactive ones.
    #[must_use]
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// Returns active sensors together with their slot index.
    pub fn active_sensors(&self) -> impl Iterator<Item = (usize, &Sensor)> {
        self.sensors.iter().enumerate().filter(|(_, s)| s.is_active())
    }

    /// Returns active sensors mutably together with their slot index.
    pub fn active_sensors_mut(&mut self) -> impl Iterator<Item = (usize, &mut Sensor)> {
        self.sensors
            .iter_mut()
            .enumerate()
            .filter(|(_, s)| s.is_active())
    }

    /// Finds an active sensor by name, ignoring case.
    #[must_use]
    pub fn find_sensor(&self, key: &str) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.is_active() && s.matches(key))
    }

    /// Stores a polled value for the sensor named `key`.
    ///
    /// Returns `None` if no active sensor has that name, otherwise whether
    /// the value changed.
    pub fn record_reading(&mut self, key: &str, value: f64, now: DateTime<Utc>) -> Option<bool> {
        self.sensors
            .iter_mut()
            .find(|s| s.is_active() && s.matches(key))
            .map(|s| s.reading_mut().record(value, now))
    }

    // ========== Scenes ==========

    /// Returns the scene table.
    #[must_use]
    pub fn scenes(&self) -> &SceneTable {
        &self.scenes
    }

    /// Returns the scene table mutably.
    pub fn scenes_mut(&mut self) -> &mut SceneTable {
        &mut self.scenes
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::SensorKind;

    fn profile() -> DeviceProfile {
        let mut profile = DeviceProfile::new("VENTA-1", "Bedroom", "10.0.0.2");
        profile
            .add_sensor(Sensor::new("hum", SensorKind::Humidity, 1))
            .unwrap();
        profile
            .add_sensor(Sensor::new("temp", SensorKind::Temperature, 1).with_active(false))
            .unwrap();
        profile
            .add_sensor(Sensor::new("humt", SensorKind::Humidity, 2))
            .unwrap();
        profile
    }

    #[test]
    fn inactive_slots_are_skipped() {
        let profile = profile();
        let indices: Vec<usize> = profile.active_sensors().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![0, 2]);
        assert!(profile.find_sensor("temp").is_none());
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut profile = profile();
        let err = profile
            .add_sensor(Sensor::new("HUM", SensorKind::Humidity, 1))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSensor(name) if name == "HUM"));
    }

    #[test]
    fn capacity_is_enforced() {
        let mut profile = DeviceProfile::new("id", "name", "ip");
        for i in 0..DeviceProfile::DEFAULT_SENSOR_CAPACITY {
            profile
                .add_sensor(Sensor::new(format!("s{i}"), SensorKind::Other(0), 0))
                .unwrap();
        }
        assert!(
            profile
                .add_sensor(Sensor::new("extra", SensorKind::Other(0), 0))
                .is_err()
        );
    }

    #[test]
    fn record_reading_matches_case_insensitively() {
        let mut profile = profile();
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(profile.record_reading("HUM", 40.0, now), Some(true));
        assert_eq!(profile.record_reading("hum", 40.0, now), Some(false));
        assert_eq!(profile.record_reading("unknown", 1.0, now), None);
        assert_eq!(profile.record_reading("temp", 1.0, now), None);
    }

    #[test]
    fn zone_defaults_and_updates() {
        let mut profile = profile();
        assert_eq!(profile.zone_id(), DEFAULT_ZONE_ID);
        profile.set_zone_id(3);
        assert_eq!(profile.zone_id(), 3);
    }
}
