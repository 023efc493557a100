// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! On-disk layout of the configuration file.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LoadedConfig, Settings};
use crate::error::{ConfigError, ValueError};
use crate::profile::{DEFAULT_ZONE_ID, DeviceProfile, SceneSpec, SceneTable, Sensor};
use crate::types::{DsUid, FanSpeed, SensorKind};

/// Raw contents of the configuration file.
///
/// Sensor and scene tables are keyed `s0`, `s1`, ... and only a contiguous
/// run starting at `s0` is read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// dSUID of the vDC container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vdcdsuid: Option<String>,
    /// dSUID of the library instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libdsuid: Option<String>,
    /// Poll interval in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reload_values: Option<u64>,
    /// Zone of the vDC container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<u16>,
    /// Syslog style verbosity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<i64>,
    /// The appliance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humifier: Option<HumifierSection>,
    /// Sensor slots.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sensor_values: BTreeMap<String, SensorSection>,
}

/// The `[humifier]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HumifierSection {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Stable appliance identifier, mandatory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Host name or IP address, mandatory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Zone of the device, defaults to the container zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<u16>,
    /// Scene slots.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scenes: BTreeMap<String, SceneSection>,
}

/// One `[humifier.scenes.sN]` table.
///
/// Negative values are treated like absent keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneSection {
    /// Bus scene number.
    #[serde(rename = "dsId")]
    pub ds_id: i32,
    /// Fan level 1-3.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan: Option<i64>,
    /// Automatic mode, 0 or 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_automatic: Option<i64>,
    /// Sleep mode, 0 or 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_sleep: Option<i64>,
}

/// One `[sensor_values.sN]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSection {
    /// Key in the appliance's data document.
    #[serde(default)]
    pub value_name: String,
    /// Bus sensor type.
    #[serde(default)]
    pub sensor_type: u32,
    /// Bus sensor usage.
    #[serde(default)]
    pub sensor_usage: u32,
    /// Whether the sensor is reported.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

fn slot_key(index: usize) -> String {
    format!("s{index}")
}

/// Returns `Some` only for a non-blank string.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn optional_flag(value: Option<i64>) -> Option<bool> {
    value.filter(|v| *v >= 0).map(|v| v > 0)
}

impl ConfigFile {
    /// Returns the file written when no configuration exists yet.
    ///
    /// `id` and `ip` are left empty so that starting with the untouched
    /// template fails.
    #[must_use]
    pub fn template() -> Self {
        let mut sensor_values = BTreeMap::new();
        sensor_values.insert(
            slot_key(0),
            SensorSection {
                value_name: "hum".to_string(),
                sensor_type: SensorKind::Humidity.code(),
                sensor_usage: 1,
                active: true,
            },
        );
        sensor_values.insert(
            slot_key(1),
            SensorSection {
                value_name: "temp".to_string(),
                sensor_type: SensorKind::Temperature.code(),
                sensor_usage: 1,
                active: true,
            },
        );

        let mut scenes = BTreeMap::new();
        scenes.insert(
            slot_key(0),
            SceneSection {
                ds_id: 5,
                fan: Some(2),
                mode_automatic: Some(0),
                mode_sleep: Some(0),
            },
        );

        Self {
            vdcdsuid: None,
            libdsuid: None,
            reload_values: Some(Settings::DEFAULT_RELOAD_INTERVAL.as_secs()),
            zone_id: Some(DEFAULT_ZONE_ID),
            debug: Some(i64::from(Settings::DEFAULT_DEBUG_LEVEL)),
            humifier: Some(HumifierSection {
                name: Some("Venta".to_string()),
                id: Some(String::new()),
                ip: Some(String::new()),
                zone_id: None,
                scenes,
            }),
            sensor_values,
        }
    }

    /// Builds the file contents from the running state.
    #[must_use]
    pub fn from_parts(
        profile: &DeviceProfile,
        settings: &Settings,
        vdc_dsuid: &DsUid,
        lib_dsuid: &DsUid,
    ) -> Self {
        let sensor_values = profile
            .sensors()
            .iter()
            .enumerate()
            .map(|(i, sensor)| {
                (
                    slot_key(i),
                    SensorSection {
                        value_name: sensor.name().to_string(),
                        sensor_type: sensor.kind().code(),
                        sensor_usage: sensor.usage(),
                        active: sensor.is_active(),
                    },
                )
            })
            .collect();

        let scenes = profile
            .scenes()
            .slots()
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                (
                    slot_key(i),
                    SceneSection {
                        ds_id: slot.ds_id,
                        fan: slot.spec.fan.map(|f| i64::from(f.value())),
                        mode_automatic: slot.spec.auto_mode.map(i64::from),
                        mode_sleep: slot.spec.sleep_mode.map(i64::from),
                    },
                )
            })
            .collect();

        Self {
            vdcdsuid: Some(vdc_dsuid.to_string()),
            libdsuid: Some(lib_dsuid.to_string()),
            reload_values: Some(settings.reload_interval.as_secs()),
            zone_id: Some(settings.default_zone_id),
            debug: settings.debug_level.map(i64::from),
            humifier: Some(HumifierSection {
                name: Some(profile.name().to_string()),
                id: Some(profile.id().to_string()),
                ip: Some(profile.address().to_string()),
                zone_id: Some(profile.zone_id()),
                scenes,
            }),
            sensor_values,
        }
    }

    /// Validates the file and turns it into a profile and settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` if `humifier.id` or `humifier.ip`
    /// is absent or empty, `ConfigError::InvalidValue` for out of range
    /// values or malformed dSUIDs, and `ConfigError::DuplicateSensor` for
    /// repeated sensor names.
    pub fn into_loaded(self, loaded_at: DateTime<Utc>) -> Result<LoadedConfig, ConfigError> {
        let settings = Settings {
            reload_interval: match self.reload_values {
                None => Settings::DEFAULT_RELOAD_INTERVAL,
                Some(0) => {
                    return Err(ConfigError::InvalidValue {
                        field: "reload_values".to_string(),
                        message: "must be at least one second".to_string(),
                    });
                }
                Some(secs) if Duration::from_secs(secs) > Settings::MAX_RELOAD_INTERVAL => {
                    return Err(ConfigError::InvalidValue {
                        field: "reload_values".to_string(),
                        message: format!(
                            "must be at most {} seconds",
                            Settings::MAX_RELOAD_INTERVAL.as_secs()
                        ),
                    });
                }
                Some(secs) => Duration::from_secs(secs),
            },
            default_zone_id: self.zone_id.unwrap_or(DEFAULT_ZONE_ID),
            debug_level: self.debug.and_then(|level| {
                let level = u8::try_from(level).ok()?;
                (level <= Settings::MAX_DEBUG_LEVEL).then_some(level)
            }),
        };

        let vdc_dsuid = parse_dsuid("vdcdsuid", self.vdcdsuid)?;
        let lib_dsuid = parse_dsuid("libdsuid", self.libdsuid)?;

        let humifier = self
            .humifier
            .ok_or(ConfigError::MissingField("humifier.id"))?;
        let id = non_empty(humifier.id).ok_or(ConfigError::MissingField("humifier.id"))?;
        let ip = non_empty(humifier.ip).ok_or(ConfigError::MissingField("humifier.ip"))?;
        let name = humifier.name.unwrap_or_else(|| id.clone());
        let zone_id = humifier.zone_id.unwrap_or(settings.default_zone_id);

        let mut profile = DeviceProfile::new(id, name, ip)
            .with_zone_id(zone_id)
            .with_loaded_at(loaded_at);

        load_sensors(&mut profile, &self.sensor_values)?;
        load_scenes(profile.scenes_mut(), &humifier.scenes)?;

        Ok(LoadedConfig {
            profile,
            settings,
            vdc_dsuid,
            lib_dsuid,
        })
    }
}

fn parse_dsuid(field: &str, value: Option<String>) -> Result<Option<DsUid>, ConfigError> {
    non_empty(value)
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|e: ValueError| ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: e.to_string(),
                })
        })
        .transpose()
}

fn load_sensors(
    profile: &mut DeviceProfile,
    sections: &BTreeMap<String, SensorSection>,
) -> Result<(), ConfigError> {
    let capacity = DeviceProfile::DEFAULT_SENSOR_CAPACITY;
    for index in 0..capacity {
        let Some(section) = sections.get(&slot_key(index)) else {
            break;
        };
        if section.value_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("sensor_values.{}.value_name", slot_key(index)),
                message: "sensor name is empty".to_string(),
            });
        }
        let sensor = Sensor::new(
            section.value_name.clone(),
            SensorKind::from(section.sensor_type),
            section.sensor_usage,
        )
        .with_active(section.active);
        profile.add_sensor(sensor)?;
    }

    if sections.len() > profile.sensors().len() {
        tracing::warn!(
            configured = sections.len(),
            loaded = profile.sensors().len(),
            "Ignoring sensor entries beyond the first gap or the slot limit"
        );
    }
    Ok(())
}

fn load_scenes(
    table: &mut SceneTable,
    sections: &BTreeMap<String, SceneSection>,
) -> Result<(), ConfigError> {
    for index in 0..table.capacity() {
        let key = slot_key(index);
        let Some(section) = sections.get(&key) else {
            break;
        };
        let fan = section
            .fan
            .filter(|f| *f >= 0)
            .map(FanSpeed::try_from)
            .transpose()
            .map_err(|e| ConfigError::InvalidValue {
                field: format!("humifier.scenes.{key}.fan"),
                message: e.to_string(),
            })?;
        let spec = SceneSpec {
            fan,
            sleep_mode: optional_flag(section.mode_sleep),
            auto_mode: optional_flag(section.mode_automatic),
        };
        if table.is_configured(section.ds_id) {
            tracing::warn!(scene = section.ds_id, slot = %key, "Scene configured twice, keeping the last entry");
        }
        table.insert(section.ds_id, spec);
    }

    if sections.len() > table.len() {
        tracing::warn!(
            configured = sections.len(),
            loaded = table.len(),
            "Ignoring scene entries beyond the first gap or the slot limit"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> ConfigFile {
        toml::from_str(
            r#"
            [humifier]
            id = "VENTA-1"
            ip = "10.0.0.2"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn defaults_apply() {
        let loaded = minimal().into_loaded(Utc::now()).unwrap();
        assert_eq!(loaded.settings, Settings::default());
        assert_eq!(loaded.profile.name(), "VENTA-1");
        assert_eq!(loaded.profile.zone_id(), DEFAULT_ZONE_ID);
        assert!(loaded.vdc_dsuid.is_none());
        assert!(loaded.profile.sensors().is_empty());
    }

    #[test]
    fn missing_id_is_fatal() {
        let file: ConfigFile = toml::from_str("[humifier]\nip = \"10.0.0.2\"").unwrap();
        let err = file.into_loaded(Utc::now()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("humifier.id")));
    }

    #[test]
    fn empty_ip_is_fatal() {
        let file: ConfigFile = toml::from_str("[humifier]\nid = \"x\"\nip = \"\"").unwrap();
        let err = file.into_loaded(Utc::now()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("humifier.ip")));
    }

    #[test]
    fn template_fails_until_edited() {
        let err = ConfigFile::template().into_loaded(Utc::now()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("humifier.id")));
    }

    #[test]
    fn sensors_stop_at_first_gap() {
        let file: ConfigFile = toml::from_str(
            r#"
            [humifier]
            id = "VENTA-1"
            ip = "10.0.0.2"

            [sensor_values.s0]
            value_name = "hum"
            sensor_type = 2
            sensor_usage = 1

            [sensor_values.s1]
            value_name = "temp"
            sensor_type = 1
            active = false

            [sensor_values.s3]
            value_name = "waterlevel"
            "#,
        )
        .unwrap();
        let loaded = file.into_loaded(Utc::now()).unwrap();
        let names: Vec<&str> = loaded.profile.sensors().iter().map(Sensor::name).collect();
        assert_eq!(names, vec!["hum", "temp"]);
        assert!(!loaded.profile.sensors()[1].is_active());
        assert_eq!(loaded.profile.sensors()[0].kind(), SensorKind::Humidity);
    }

    #[test]
    fn negative_scene_values_mean_unset() {
        let file: ConfigFile = toml::from_str(
            r#"
            [humifier]
            id = "VENTA-1"
            ip = "10.0.0.2"

            [humifier.scenes.s0]
            dsId = 17
            fan = -1
            mode_sleep = 1
            mode_automatic = -1
            "#,
        )
        .unwrap();
        let loaded = file.into_loaded(Utc::now()).unwrap();
        let spec = loaded.profile.scenes().get(17).unwrap();
        assert_eq!(spec.fan, None);
        assert_eq!(spec.sleep_mode, Some(true));
        assert_eq!(spec.auto_mode, None);
    }

    #[test]
    fn invalid_fan_is_rejected() {
        let file: ConfigFile = toml::from_str(
            r#"
            [humifier]
            id = "VENTA-1"
            ip = "10.0.0.2"

            [humifier.scenes.s0]
            dsId = 17
            fan = 4
            "#,
        )
        .unwrap();
        let err = file.into_loaded(Utc::now()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field, .. } if field == "humifier.scenes.s0.fan"));
    }

    #[test]
    fn debug_above_limit_is_ignored() {
        let mut file = minimal();
        file.debug = Some(11);
        assert_eq!(file.into_loaded(Utc::now()).unwrap().settings.debug_level, None);

        let mut file = minimal();
        file.debug = Some(7);
        assert_eq!(file.into_loaded(Utc::now()).unwrap().settings.debug_level, Some(7));
    }

    #[test]
    fn malformed_dsuid_is_rejected() {
        let mut file = minimal();
        file.vdcdsuid = Some("not-a-dsuid".to_string());
        let err = file.into_loaded(Utc::now()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field, .. } if field == "vdcdsuid"));
    }

    #[test]
    fn zero_reload_interval_is_rejected() {
        let mut file = minimal();
        file.reload_values = Some(0);
        assert!(file.into_loaded(Utc::now()).is_err());
    }

    #[test]
    fn reload_interval_above_one_day_is_rejected() {
        let mut file = minimal();
        file.reload_values = Some(u64::MAX);
        let err = file.into_loaded(Utc::now()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "reload_values"));

        let mut file = minimal();
        file.reload_values = Some(86_400);
        let loaded = file.into_loaded(Utc::now()).unwrap();
        assert_eq!(loaded.settings.reload_interval, Settings::MAX_RELOAD_INTERVAL);
    }

    #[test]
    fn device_zone_defaults_to_container_zone() {
        let mut file = minimal();
        file.zone_id = Some(12);
        let loaded = file.into_loaded(Utc::now()).unwrap();
        assert_eq!(loaded.settings.default_zone_id, 12);
        assert_eq!(loaded.profile.zone_id(), 12);
    }
}
