// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoding of appliance readings.
//!
//! The appliance answers `POST /api/data` with a flat JSON object. The
//! operating state sits in a nested `device` object, everything else is a
//! candidate for one of the configured sensors.
//!
//! ```json
//! {
//!   "device": {"hum": 45, "temp": 22, "humt": 50, "auto": 0, "sleep": 1, "fan": 2},
//!   "waterlevel": 1
//! }
//! ```

mod data_parser;

pub use data_parser::{DataReport, DeviceReport};
