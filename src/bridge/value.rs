// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property tree exchanged with the bus.

use std::fmt;

/// A single property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Floating point number.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Binary blob, used for icons.
    Bytes(Vec<u8>),
    /// Nested property list.
    Object(PropertyObject),
}

impl PropertyValue {
    /// Returns the value as `u64` if it is an unsigned integer.
    #[must_use]
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a string slice if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the nested object if the value is one.
    #[must_use]
    pub fn as_object(&self) -> Option<&PropertyObject> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u64> for PropertyValue {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<PropertyObject> for PropertyValue {
    fn from(v: PropertyObject) -> Self {
        Self::Object(v)
    }
}

/// Ordered list of named properties.
///
/// Insertion order is kept since the bus protocol transports properties as
/// a list, not a map.
///
/// # Examples
///
/// ```
/// use venta_vdc::bridge::{PropertyObject, PropertyValue};
///
/// let caps = PropertyObject::new()
///     .with("metering", false)
///     .with("dynamicDefinitions", true);
///
/// assert_eq!(caps.get("metering"), Some(&PropertyValue::Bool(false)));
/// assert_eq!(caps.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyObject {
    entries: Vec<(String, PropertyValue)>,
}

impl PropertyObject {
    /// Creates an empty object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a property and returns the object.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.push(name, value);
        self
    }

    /// Appends a property.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Returns the first property with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Returns the property names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Returns the entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One element of a get-property query.
///
/// A `None` name is a wildcard. Children narrow the request, for example
/// `sensorStates` with a child named `"2"` asks for the third sensor only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryItem {
    /// Requested property, `None` for a wildcard.
    pub name: Option<String>,
    /// Nested query.
    pub children: Vec<QueryItem>,
}

impl QueryItem {
    /// Creates a query for one property.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            children: Vec::new(),
        }
    }

    /// Adds a child query.
    #[must_use]
    pub fn with_child(mut self, child: QueryItem) -> Self {
        self.children.push(child);
        self
    }
}

/// One element of a set-property or generic request.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntry {
    /// Property name, `None` for a wildcard.
    pub name: Option<String>,
    /// New value.
    pub value: PropertyValue,
}

impl PropertyEntry {
    /// Creates a named entry.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            name: Some(name.into()),
            value: value.into(),
        }
    }
}

/// Result code of a set-property or generic request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// Applied.
    Ok,
    /// The property does not exist or is read only.
    NotFound,
    /// The value has the wrong type or range.
    InvalidValueType,
    /// Wildcards and unknown commands.
    NotImplemented,
    /// The request carried no usable data.
    MissingData,
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Ok => "ok",
            Self::NotFound => "not found",
            Self::InvalidValueType => "invalid value type",
            Self::NotImplemented => "not implemented",
            Self::MissingData => "missing data",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keeps_insertion_order() {
        let obj = PropertyObject::new()
            .with("b", 1_u64)
            .with("a", "x")
            .with("c", 0.5);
        let names: Vec<&str> = obj.names().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn get_returns_first_match() {
        let mut obj = PropertyObject::new();
        obj.push("k", 1_i64);
        obj.push("k", 2_i64);
        assert_eq!(obj.get("k"), Some(&PropertyValue::Int(1)));
        assert_eq!(obj.get("missing"), None);
    }

    #[test]
    fn accessors_check_variant() {
        assert_eq!(PropertyValue::Uint(7).as_uint(), Some(7));
        assert_eq!(PropertyValue::Int(7).as_uint(), None);
        assert_eq!(PropertyValue::from("x").as_str(), Some("x"));
        assert!(PropertyValue::from(PropertyObject::new()).as_object().is_some());
    }

    #[test]
    fn query_builder() {
        let q = QueryItem::named("sensorStates").with_child(QueryItem::named("1"));
        assert_eq!(q.children[0].name.as_deref(), Some("1"));
    }
}
