// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Appliance state tracking.
//!
//! [`ApplianceState`] is the last known operating state of the humidifier.
//! It is written by the poller and by the scene refresh, and read by the
//! scene planner to decide which buttons to press.

mod appliance_state;

pub use appliance_state::ApplianceState;
