// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! digitalSTROM unique identifiers.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::ValueError;

/// Namespace for name based device identifiers.
const DEVICE_NAMESPACE: Uuid = Uuid::from_u128(0x6f1b_2c4e_9a3d_4f7b_8e21_5d0c_a4b3_f912);

/// A 17 byte dSUID, written as 34 hexadecimal digits.
///
/// A dSUID is a UUID followed by one byte that selects a sub device. The
/// bridge always uses sub device `00`.
///
/// Comparison with strings coming from the bus is case-insensitive, see
/// [`DsUid::matches`].
///
/// # Examples
///
/// ```
/// use venta_vdc::types::DsUid;
///
/// let a = DsUid::for_device("VENTA-1");
/// let b = DsUid::for_device("VENTA-1");
/// assert_eq!(a, b);
/// assert!(a.matches(&a.to_string().to_lowercase()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DsUid(String);

impl DsUid {
    /// Number of hexadecimal digits in a dSUID.
    pub const LEN: usize = 34;

    /// Generates a random dSUID.
    #[must_use]
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Derives a stable dSUID from an appliance identifier.
    #[must_use]
    pub fn for_device(id: &str) -> Self {
        Self::from_uuid(Uuid::new_v3(&DEVICE_NAMESPACE, id.as_bytes()))
    }

    fn from_uuid(uuid: Uuid) -> Self {
        Self(format!("{}00", uuid.simple()).to_ascii_uppercase())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if `other` names this dSUID, ignoring case.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for DsUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DsUid {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::LEN || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValueError::InvalidDsUid(s.to_string()));
        }
        Ok(Self(s.to_ascii_uppercase()))
    }
}
