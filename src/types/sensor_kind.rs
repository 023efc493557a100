// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor type tags as understood by the bus.

/// Kind of measurement a sensor delivers.
///
/// The bus identifies sensor types by number. Temperature and humidity are
/// named here, every other number is carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Room temperature in degrees Celsius (type 1).
    Temperature,
    /// Relative humidity in percent (type 2).
    Humidity,
    /// Any other bus sensor type.
    Other(u32),
}

impl SensorKind {
    /// Returns the bus sensor type number.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Temperature => 1,
            Self::Humidity => 2,
            Self::Other(code) => code,
        }
    }
}

impl From<u32> for SensorKind {
    fn from(code: u32) -> Self {
        match code {
            1 => Self::Temperature,
            2 => Self::Humidity,
            other => Self::Other(other),
        }
    }
}
