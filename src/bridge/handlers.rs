// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property handler tables for the container and the device.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::value::{PropertyObject, PropertyValue, QueryItem, ResultCode};
use crate::context::{BridgeState, Identity};

/// Product name used in several descriptive properties.
pub const PRODUCT_NAME: &str = "Venta Humifier";
/// File name reported for the device icon.
pub const ICON_NAME: &str = "venta-humifier-16.png";

static ICON_16: &[u8] = include_bytes!("../../assets/venta-humifier-16.png");
static ICON_48: &[u8] = include_bytes!("../../assets/venta-humifier-48.png");

/// Bus group of climate devices.
const CLIMATE_GROUP: u64 = 8;
/// Seconds after which the bus considers a silent sensor dead.
const ALIVE_SIGN_INTERVAL: f64 = 300.0;

/// Inputs available to a property reader.
pub(crate) struct ReadContext<'a> {
    pub state: &'a BridgeState,
    pub identity: &'a Identity,
    pub query: &'a QueryItem,
    pub now: DateTime<Utc>,
}

type Reader = fn(&ReadContext<'_>) -> Option<PropertyValue>;
type Writer = fn(&mut BridgeState, &PropertyValue) -> ResultCode;

/// Reader plus optional writer for one property name.
///
/// A reader returning `None` marks a known property without a value. Such
/// names are answered with nothing and do not produce a warning.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PropertyHandler {
    pub read: Reader,
    pub write: Option<Writer>,
}

impl PropertyHandler {
    fn read_only(read: Reader) -> Self {
        Self { read, write: None }
    }

    fn silent() -> Self {
        Self {
            read: no_value,
            write: None,
        }
    }
}

fn no_value(_: &ReadContext<'_>) -> Option<PropertyValue> {
    None
}

pub(crate) type HandlerTable = HashMap<&'static str, PropertyHandler>;

// ============================================================================
// Container
// ============================================================================

pub(crate) fn container_handlers() -> HandlerTable {
    let mut table = HandlerTable::new();
    table.insert(
        "hardwareGuid",
        PropertyHandler::read_only(|c| {
            Some(format!("humifier-id:{}", c.state.profile.id()).into())
        }),
    );
    table.insert(
        "displayId",
        PropertyHandler::read_only(|c| Some(c.state.profile.id().into())),
    );
    table.insert("vendorId", PropertyHandler::silent());
    table.insert("oemGuid", PropertyHandler::silent());
    table.insert("configURL", PropertyHandler::silent());
    for name in ["implementationId", "modelUID", "modelGuid"] {
        table.insert(name, PropertyHandler::read_only(|_| Some(PRODUCT_NAME.into())));
    }
    table.insert(
        "name",
        PropertyHandler::read_only(|c| {
            Some(format!("{PRODUCT_NAME} {}", c.state.profile.name()).into())
        }),
    );
    table.insert(
        "model",
        PropertyHandler::read_only(|c| {
            Some(format!("{PRODUCT_NAME} Controller @{}", c.identity.hostname()).into())
        }),
    );
    table.insert(
        "capabilities",
        PropertyHandler::read_only(|_| {
            Some(
                PropertyObject::new()
                    .with("metering", false)
                    .with("dynamicDefinitions", true)
                    .into(),
            )
        }),
    );
    table.insert(
        "zoneID",
        PropertyHandler {
            read: |c| Some(u64::from(c.state.settings.default_zone_id).into()),
            write: Some(|state, value| match zone_from(value) {
                Some(zone) => {
                    state.settings.default_zone_id = zone;
                    ResultCode::Ok
                }
                None => ResultCode::InvalidValueType,
            }),
        },
    );
    table
}

// ============================================================================
// Device
// ============================================================================

pub(crate) fn device_handlers() -> HandlerTable {
    let mut table = HandlerTable::new();
    table.insert(
        "primaryGroup",
        PropertyHandler::read_only(|_| Some(CLIMATE_GROUP.into())),
    );
    table.insert(
        "zoneID",
        PropertyHandler {
            read: |c| Some(u64::from(c.state.profile.zone_id()).into()),
            write: Some(|state, value| match zone_from(value) {
                Some(zone) => {
                    state.profile.set_zone_id(zone);
                    ResultCode::Ok
                }
                None => ResultCode::InvalidValueType,
            }),
        },
    );
    table.insert(
        "dynamicActionDescriptions",
        PropertyHandler::read_only(|_| Some(action_descriptions().into())),
    );
    table.insert(
        "outputDescription",
        PropertyHandler::read_only(|_| {
            Some(
                PropertyObject::new()
                    .with("name", PRODUCT_NAME)
                    .with("defaultGroup", 3_u64)
                    .with("function", 0_u64)
                    .with("outputUsage", 1_u64)
                    .with("variableRamp", true)
                    .with("maxPower", 100_u64)
                    .into(),
            )
        }),
    );
    table.insert(
        "outputSettings",
        PropertyHandler::read_only(|_| {
            let groups = PropertyObject::new().with("0", true).with("3", true);
            Some(
                PropertyObject::new()
                    .with("groups", groups)
                    .with("mode", 1_u64)
                    .with("pushChanges", true)
                    .into(),
            )
        }),
    );
    table.insert(
        "sensorDescriptions",
        PropertyHandler::read_only(|c| Some(sensor_descriptions(c.state).into())),
    );
    table.insert(
        "sensorSettings",
        PropertyHandler::read_only(|c| Some(sensor_settings(c.state).into())),
    );
    table.insert(
        "sensorStates",
        PropertyHandler::read_only(|c| {
            let index = requested_index(c.query);
            Some(sensor_states(c.state, c.now, index).into())
        }),
    );
    table.insert(
        "name",
        PropertyHandler::read_only(|c| Some(c.state.profile.name().into())),
    );
    table.insert("type", PropertyHandler::read_only(|_| Some("vDSD".into())));
    table.insert("model", PropertyHandler::read_only(|_| Some("Humifier".into())));
    table.insert(
        "modelFeatures",
        PropertyHandler::read_only(|_| {
            Some(
                PropertyObject::new()
                    .with("dontcare", false)
                    .with("blink", false)
                    .with("outmode", false)
                    .with("jokerconfig", true)
                    .into(),
            )
        }),
    );
    table.insert(
        "modelUID",
        PropertyHandler::read_only(|_| Some(PRODUCT_NAME.into())),
    );
    table.insert("modelVersion", PropertyHandler::read_only(|_| Some("0".into())));
    table.insert(
        "vendorId",
        PropertyHandler::read_only(|_| Some("vendor: Venta".into())),
    );
    table.insert("vendorName", PropertyHandler::read_only(|_| Some("Venta".into())));
    table.insert(
        "vendorGuid",
        PropertyHandler::read_only(|c| Some(format!("Venta vDC {}", c.state.profile.id()).into())),
    );
    table.insert(
        "hardwareVersion",
        PropertyHandler::read_only(|_| Some("0.0.0".into())),
    );
    table.insert("configURL", PropertyHandler::read_only(|_| Some("".into())));
    table.insert(
        "hardwareModelGuid",
        PropertyHandler::read_only(|_| Some("".into())),
    );
    table.insert(
        "deviceIcon16",
        PropertyHandler::read_only(|_| Some(PropertyValue::Bytes(ICON_16.to_vec()))),
    );
    table.insert(
        "deviceIcon48",
        PropertyHandler::read_only(|_| Some(PropertyValue::Bytes(ICON_48.to_vec()))),
    );
    table.insert(
        "deviceIconName",
        PropertyHandler::read_only(|_| Some(ICON_NAME.into())),
    );
    for name in [
        "buttonInputDescriptions",
        "buttonInputSettings",
        "binaryInputDescriptions",
        "binaryInputSettings",
        "binaryInputStates",
        "channelDescriptions",
        "channelSettings",
        "channelStates",
        "deviceStates",
        "deviceProperties",
        "devicePropertyDescriptions",
        "customActions",
        "deviceClass",
        "deviceClassVersion",
        "oemGuid",
        "oemModelGuid",
    ] {
        table.insert(name, PropertyHandler::silent());
    }
    table
}

/// Accepts an unsigned integer that fits a zone id.
fn zone_from(value: &PropertyValue) -> Option<u16> {
    value.as_uint().and_then(|v| u16::try_from(v).ok())
}

fn action(id: &str, title: &str) -> PropertyObject {
    let id = format!("dynamic.{id}");
    PropertyObject::new()
        .with("id", id.clone())
        .with("action", id)
        .with("title", title)
        .with("description", title)
}

fn action_descriptions() -> PropertyObject {
    [
        ("ActTurnOn", "01-Einschalten"),
        ("ActTurnOff", "02-Ausschalten"),
        ("ActFan1", "03-Fanspeed 1"),
        ("ActFan2", "04-Fanspeed 2"),
        ("ActFan3", "05-Fanspeed 3"),
        ("ActSleepModeOn", "06-Schlafmodus an"),
        ("ActSleepModeOff", "07-Schlafmodus aus"),
        ("ActAutoModeOn", "08-Automatikmodus an"),
        ("ActAutoModeOff", "09-Automatikmodus aus"),
    ]
    .into_iter()
    .fold(PropertyObject::new(), |obj, (id, title)| {
        obj.with(id, action(id, title))
    })
}

fn sensor_descriptions(state: &BridgeState) -> PropertyObject {
    let device_name = state.profile.name();
    let mut out = PropertyObject::new();
    for (index, sensor) in state.profile.active_sensors() {
        out.push(
            index.to_string(),
            PropertyObject::new()
                .with("name", format!("{device_name}-{}", sensor.name()))
                .with("sensorType", u64::from(sensor.kind().code()))
                .with("sensorUsage", u64::from(sensor.usage()))
                .with("aliveSignInterval", ALIVE_SIGN_INTERVAL),
        );
    }
    out
}

fn sensor_settings(state: &BridgeState) -> PropertyObject {
    let mut out = PropertyObject::new();
    for (index, _) in state.profile.active_sensors() {
        out.push(
            index.to_string(),
            PropertyObject::new()
                .with("group", CLIMATE_GROUP)
                .with("minPushInterval", 5_u64)
                .with("changesOnlyInterval", 5.0),
        );
    }
    out
}

/// Reads the sensor index from the first child of a `sensorStates` query.
fn requested_index(query: &QueryItem) -> Option<usize> {
    query
        .children
        .first()
        .and_then(|child| child.name.as_deref())
        .and_then(|name| name.trim().parse().ok())
}

/// Builds `index -> {value, age, error}` for active sensors.
///
/// With `only` set, just that slot is reported.
pub(crate) fn sensor_states(
    state: &BridgeState,
    now: DateTime<Utc>,
    only: Option<usize>,
) -> PropertyObject {
    let loaded_at = state.profile.loaded_at();
    let mut out = PropertyObject::new();
    for (index, sensor) in state.profile.active_sensors() {
        if only.is_some_and(|i| i != index) {
            continue;
        }
        let reading = sensor.reading();
        out.push(
            index.to_string(),
            PropertyObject::new()
                .with("value", reading.value())
                .with("age", reading.age_seconds(now, loaded_at))
                .with("error", 0_i64),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::config::Settings;
    use crate::profile::{DeviceProfile, Sensor};
    use crate::types::{DsUid, SensorKind};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn state() -> BridgeState {
        let mut profile = DeviceProfile::new("VENTA-1", "Bedroom", "10.0.0.2").with_loaded_at(at(0));
        profile
            .add_sensor(Sensor::new("hum", SensorKind::Humidity, 1))
            .unwrap();
        profile
            .add_sensor(Sensor::new("temp", SensorKind::Temperature, 1).with_active(false))
            .unwrap();
        profile
            .add_sensor(Sensor::new("waterlevel", SensorKind::Other(0), 0))
            .unwrap();
        BridgeState::new(profile, Settings::default())
    }

    fn identity() -> Identity {
        Identity::new(DsUid::random(), DsUid::random(), DsUid::for_device("VENTA-1"), "host")
    }

    #[test]
    fn sensor_states_skip_inactive_slots() {
        let states = sensor_states(&state(), at(30), None);
        let names: Vec<&str> = states.names().collect();
        assert_eq!(names, vec!["0", "2"]);
        let first = states.get("0").and_then(PropertyValue::as_object).unwrap();
        assert_eq!(first.get("age"), Some(&PropertyValue::Int(30)));
        assert_eq!(first.get("error"), Some(&PropertyValue::Int(0)));
    }

    #[test]
    fn sensor_states_honour_index_filter() {
        let states = sensor_states(&state(), at(30), Some(2));
        let names: Vec<&str> = states.names().collect();
        assert_eq!(names, vec!["2"]);
    }

    #[test]
    fn requested_index_from_child() {
        let query = QueryItem::named("sensorStates").with_child(QueryItem::named("2"));
        assert_eq!(requested_index(&query), Some(2));
        assert_eq!(requested_index(&QueryItem::named("sensorStates")), None);
        let bad = QueryItem::named("sensorStates").with_child(QueryItem::named("x"));
        assert_eq!(requested_index(&bad), None);
    }

    #[test]
    fn sensor_description_names_include_device() {
        let descriptions = sensor_descriptions(&state());
        let first = descriptions.get("0").and_then(PropertyValue::as_object).unwrap();
        assert_eq!(first.get("name"), Some(&PropertyValue::from("Bedroom-hum")));
        assert_eq!(first.get("sensorType"), Some(&PropertyValue::Uint(2)));
        assert_eq!(first.get("aliveSignInterval"), Some(&PropertyValue::Double(300.0)));
    }

    #[test]
    fn action_descriptions_are_unique() {
        let actions = action_descriptions();
        assert_eq!(actions.len(), 9);
        let fan2 = actions.get("ActFan2").and_then(PropertyValue::as_object).unwrap();
        assert_eq!(fan2.get("id"), Some(&PropertyValue::from("dynamic.ActFan2")));
        assert_eq!(fan2.get("title"), Some(&PropertyValue::from("04-Fanspeed 2")));
    }

    #[test]
    fn zone_writes_check_type_and_range() {
        let table = device_handlers();
        let write = table["zoneID"].write.unwrap();
        let mut state = state();
        assert_eq!(write(&mut state, &PropertyValue::Uint(7)), ResultCode::Ok);
        assert_eq!(state.profile.zone_id(), 7);
        assert_eq!(
            write(&mut state, &PropertyValue::Int(7)),
            ResultCode::InvalidValueType
        );
        assert_eq!(
            write(&mut state, &PropertyValue::Uint(70_000)),
            ResultCode::InvalidValueType
        );
        assert_eq!(state.profile.zone_id(), 7);
    }

    #[test]
    fn container_model_names_host() {
        let table = container_handlers();
        let state = state();
        let identity = identity();
        let query = QueryItem::named("model");
        let ctx = ReadContext {
            state: &state,
            identity: &identity,
            query: &query,
            now: at(0),
        };
        assert_eq!(
            (table["model"].read)(&ctx),
            Some(PropertyValue::from("Venta Humifier Controller @host"))
        );
        assert_eq!((table["vendorId"].read)(&ctx), None);
    }

    #[test]
    fn icons_are_png() {
        assert!(ICON_16.starts_with(b"\x89PNG"));
        assert!(ICON_48.starts_with(b"\x89PNG"));
    }
}
