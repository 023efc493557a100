// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport to the appliance.
//!
//! The humidifier exposes two endpoints on its local web server:
//!
//! - `POST /api/data` with an empty body returns the current readings
//! - `POST /api/btn` with `{"btn": <code>}` simulates a front panel button
//!
//! [`HttpClient`] performs the requests, higher level decoding lives in
//! [`crate::appliance`].

mod http;

pub use http::{HttpClient, HttpConfig};
