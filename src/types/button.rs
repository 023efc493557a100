// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Front panel buttons of the appliance.
//!
//! The appliance has no absolute setters. Every change is a simulated
//! button press sent to `/api/btn`, so the bridge has to know the current
//! state to decide which buttons to press.

use std::fmt;

use crate::error::ValueError;

/// A button press accepted by `/api/btn`.
///
/// The numeric codes are fixed by the appliance firmware.
///
/// # Examples
///
/// ```
/// use venta_vdc::types::Button;
///
/// assert_eq!(Button::FanUp.code(), 3);
/// assert_eq!(Button::try_from(6).unwrap(), Button::ToggleAuto);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// Raise the fan speed by one step (code 3).
    FanUp,
    /// Lower the fan speed by one step (code 4).
    FanDown,
    /// Toggle sleep mode (code 5).
    ToggleSleep,
    /// Toggle automatic mode (code 6).
    ToggleAuto,
}

impl Button {
    /// Returns the firmware code for this button.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::FanUp => 3,
            Self::FanDown => 4,
            Self::ToggleSleep => 5,
            Self::ToggleAuto => 6,
        }
    }

    /// Returns a short human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FanUp => "fan up",
            Self::FanDown => "fan down",
            Self::ToggleSleep => "toggle sleep",
            Self::ToggleAuto => "toggle auto",
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.label())
    }
}

impl TryFrom<u8> for Button {
    type Error = ValueError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            3 => Ok(Self::FanUp),
            4 => Ok(Self::FanDown),
            5 => Ok(Self::ToggleSleep),
            6 => Ok(Self::ToggleAuto),
            other => Err(ValueError::OutOfRange {
                min: 3,
                max: 6,
                actual: i64::from(other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for button in [
            Button::FanUp,
            Button::FanDown,
            Button::ToggleSleep,
            Button::ToggleAuto,
        ] {
            assert_eq!(Button::try_from(button.code()).unwrap(), button);
        }
    }

    #[test]
    fn unknown_codes_rejected() {
        assert!(Button::try_from(2).is_err());
        assert!(Button::try_from(7).is_err());
    }

    #[test]
    fn display_shows_code_and_label() {
        assert_eq!(Button::ToggleSleep.to_string(), "5 (toggle sleep)");
    }
}
