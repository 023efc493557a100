// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use venta_vdc::bridge::PropertyObject;
use venta_vdc::bus::BusTransport;
use venta_vdc::config::Settings;
use venta_vdc::context::{BridgeContext, BridgeState, Identity};
use venta_vdc::error::BusError;
use venta_vdc::profile::{DeviceProfile, SceneSpec, Sensor};
use venta_vdc::types::{DsUid, FanSpeed, SensorKind};

/// Scene setting fan 2, sleep on, automatic off.
pub const SCENE_NIGHT: i32 = 5;
/// Scene setting fan 1 only.
pub const SCENE_LOW: i32 = 17;
/// Scene setting fan 3 only.
pub const SCENE_HIGH: i32 = 18;

/// One outgoing transport call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    AnnounceContainer(DsUid),
    AnnounceDevice(DsUid),
    Identify(DsUid),
    Vanished(DsUid),
    Pong(DsUid),
    Push(DsUid, PropertyObject),
}

/// Transport that records every call.
#[derive(Debug)]
pub struct RecordingTransport {
    session: AtomicBool,
    calls: Mutex<Vec<Call>>,
}

impl RecordingTransport {
    pub fn new(session: bool) -> Self {
        Self {
            session: AtomicBool::new(session),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_session(&self, open: bool) {
        self.session.store(open, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: Call) -> Result<(), BusError> {
        self.calls.lock().push(call);
        Ok(())
    }
}

impl BusTransport for RecordingTransport {
    fn has_session(&self) -> bool {
        self.session.load(Ordering::SeqCst)
    }

    fn announce_container(&self, vdc: &DsUid) -> Result<(), BusError> {
        self.record(Call::AnnounceContainer(vdc.clone()))
    }

    fn announce_device(&self, _vdc: &DsUid, device: &DsUid) -> Result<(), BusError> {
        self.record(Call::AnnounceDevice(device.clone()))
    }

    fn identify_device(&self, device: &DsUid) -> Result<(), BusError> {
        self.record(Call::Identify(device.clone()))
    }

    fn device_vanished(&self, device: &DsUid) -> Result<(), BusError> {
        self.record(Call::Vanished(device.clone()))
    }

    fn send_pong(&self, dsuid: &DsUid) -> Result<(), BusError> {
        self.record(Call::Pong(dsuid.clone()))
    }

    fn push_property(&self, device: &DsUid, properties: PropertyObject) -> Result<(), BusError> {
        if !self.has_session() {
            return Err(BusError::NoSession);
        }
        self.record(Call::Push(device.clone(), properties))
    }
}

pub fn identity() -> Identity {
    Identity::new(
        DsUid::random(),
        DsUid::random(),
        DsUid::for_device("VENTA-1"),
        "testhost",
    )
}

/// Profile with three sensors and three scenes.
pub fn profile(address: &str) -> DeviceProfile {
    let mut profile = DeviceProfile::new("VENTA-1", "Bedroom", address);
    profile
        .add_sensor(Sensor::new("hum", SensorKind::Humidity, 1))
        .unwrap();
    profile
        .add_sensor(Sensor::new("temp", SensorKind::Temperature, 1))
        .unwrap();
    profile
        .add_sensor(Sensor::new("waterlevel", SensorKind::Other(0), 0))
        .unwrap();

    let scenes = profile.scenes_mut();
    scenes.insert(
        SCENE_NIGHT,
        SceneSpec {
            fan: Some(FanSpeed::MEDIUM),
            sleep_mode: Some(true),
            auto_mode: Some(false),
        },
    );
    scenes.insert(
        SCENE_LOW,
        SceneSpec {
            fan: Some(FanSpeed::LOW),
            ..SceneSpec::default()
        },
    );
    scenes.insert(
        SCENE_HIGH,
        SceneSpec {
            fan: Some(FanSpeed::HIGH),
            ..SceneSpec::default()
        },
    );
    profile
}

pub fn context(address: &str) -> Arc<BridgeContext> {
    Arc::new(BridgeContext::new(
        BridgeState::new(profile(address), Settings::default()),
        identity(),
    ))
}

/// A data document with the given operating state.
pub fn data_body(fan: i64, sleep: i64, auto: i64, hum: i64) -> serde_json::Value {
    serde_json::json!({
        "device": {
            "hum": hum,
            "temp": 21,
            "humt": 50,
            "auto": auto,
            "sleep": sleep,
            "fan": fan
        },
        "waterlevel": 1,
        "version": "2.1"
    })
}
