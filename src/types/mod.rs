// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the bridge.
//!
//! Each type checks its range at construction time, so a value that made it
//! into the profile or a scene is known to be valid.
//!
//! # Types
//!
//! - [`Button`] - Front panel button codes accepted by the appliance
//! - [`FanSpeed`] - Fan level (1-3)
//! - [`SensorKind`] - Bus sensor type tag
//! - [`DsUid`] - digitalSTROM identifier of the container and the device

mod button;
mod dsuid;
mod fan;
mod sensor_kind;

pub use button::Button;
pub use dsuid::DsUid;
pub use fan::FanSpeed;
pub use sensor_kind::SensorKind;
