// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration profile.
//!
//! The bridge keeps its whole configuration in one TOML file: identity,
//! poll interval, the appliance address, sensors and scenes. The file is
//! read once at startup and rewritten whenever the bus changes something
//! persistent (zone, saved scenes) or new dSUIDs were generated.
//!
//! ```toml
//! reload_values = 60
//! zone_id = 65534
//!
//! [humifier]
//! name = "Bedroom"
//! id = "VENTA-1"
//! ip = "192.168.1.50"
//!
//! [humifier.scenes.s0]
//! dsId = 5
//! fan = 2
//!
//! [sensor_values.s0]
//! value_name = "hum"
//! sensor_type = 2
//! sensor_usage = 1
//! ```

mod file;
mod store;

use std::time::Duration;

pub use file::{ConfigFile, HumifierSection, SceneSection, SensorSection};
pub use store::ConfigStore;

use crate::profile::DeviceProfile;
use crate::types::DsUid;

/// Runtime settings that are not part of the device profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Time between two successful polls.
    pub reload_interval: Duration,
    /// Zone reported for the vDC container.
    pub default_zone_id: u16,
    /// Syslog style verbosity from the file, if set and valid.
    pub debug_level: Option<u8>,
}

impl Settings {
    /// Poll interval used when the file does not set one.
    pub const DEFAULT_RELOAD_INTERVAL: Duration = Duration::from_secs(60);
    /// Longest accepted poll interval, one day.
    pub const MAX_RELOAD_INTERVAL: Duration = Duration::from_secs(86_400);
    /// Highest accepted `debug` value.
    pub const MAX_DEBUG_LEVEL: u8 = 10;
    /// Verbosity used when neither the file nor the command line sets one.
    pub const DEFAULT_DEBUG_LEVEL: u8 = 5;
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reload_interval: Self::DEFAULT_RELOAD_INTERVAL,
            default_zone_id: crate::profile::DEFAULT_ZONE_ID,
            debug_level: None,
        }
    }
}

/// Everything read from the configuration file.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The appliance with its sensors and scenes.
    pub profile: DeviceProfile,
    /// Runtime settings.
    pub settings: Settings,
    /// dSUID of the vDC container, if configured.
    pub vdc_dsuid: Option<DsUid>,
    /// dSUID of the library instance, if configured.
    pub lib_dsuid: Option<DsUid>,
}
