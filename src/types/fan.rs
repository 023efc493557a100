// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan speed of the humidifier.

use std::fmt;

use crate::error::ValueError;

/// Fan speed level (1-3).
///
/// The appliance reports and accepts three levels. Scenes use this type for
/// their optional fan target.
///
/// # Examples
///
/// ```
/// use venta_vdc::types::FanSpeed;
///
/// let speed = FanSpeed::new(2).unwrap();
/// assert_eq!(speed, FanSpeed::MEDIUM);
/// assert!(FanSpeed::new(4).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FanSpeed(u8);

impl FanSpeed {
    /// Minimum level.
    pub const MIN: u8 = 1;

    /// Maximum level.
    pub const MAX: u8 = 3;

    /// Lowest fan level.
    pub const LOW: Self = Self(1);

    /// Middle fan level.
    pub const MEDIUM: Self = Self(2);

    /// Highest fan level.
    pub const HIGH: Self = Self(3);

    /// Creates a fan speed.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value is outside [1, 3].
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValueError::OutOfRange {
                min: i64::from(Self::MIN),
                max: i64::from(Self::MAX),
                actual: i64::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Returns the level as a number.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for FanSpeed {
    type Error = ValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| ValueError::OutOfRange {
                min: i64::from(Self::MIN),
                max: i64::from(Self::MAX),
                actual: value,
            })
            .and_then(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_speed_valid() {
        for v in 1..=3 {
            assert_eq!(FanSpeed::new(v).unwrap().value(), v);
        }
    }

    #[test]
    fn fan_speed_invalid() {
        assert!(FanSpeed::new(0).is_err());
        assert!(FanSpeed::new(4).is_err());
        assert!(FanSpeed::try_from(-1_i64).is_err());
        assert!(FanSpeed::try_from(300_i64).is_err());
    }

    #[test]
    fn fan_speed_ordering() {
        assert!(FanSpeed::LOW < FanSpeed::MEDIUM);
        assert!(FanSpeed::MEDIUM < FanSpeed::HIGH);
    }
}
