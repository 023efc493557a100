// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser for the appliance's `/api/data` document.

use serde_json::{Map, Value};

use crate::error::ParseError;

/// Key of the nested object carrying the operating state.
const DEVICE_KEY: &str = "device";

/// Operating state fields from the `device` object.
///
/// Not every firmware reports every field, so all of them are optional and
/// a missing field leaves the stored value untouched when merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceReport {
    /// Measured relative humidity (`hum`).
    pub humidity: Option<i64>,
    /// Measured temperature (`temp`).
    pub temperature: Option<i64>,
    /// Target humidity (`humt`).
    pub target_humidity: Option<i64>,
    /// Automatic mode (`auto`).
    pub auto_mode: Option<bool>,
    /// Sleep mode (`sleep`).
    pub sleep_mode: Option<bool>,
    /// Fan level (`fan`).
    pub fan: Option<i64>,
}

/// Decoded `/api/data` document.
///
/// # Examples
///
/// ```
/// use venta_vdc::telemetry::DataReport;
///
/// let body = r#"{"device":{"hum":44,"temp":21,"fan":2,"sleep":0},"filter":true}"#;
/// let report = DataReport::parse(body).unwrap();
///
/// assert_eq!(report.device().humidity, Some(44));
/// assert_eq!(report.device().sleep_mode, Some(false));
/// assert!(report.values().iter().any(|(k, v)| k == "filter" && *v == 1.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataReport {
    device: DeviceReport,
    values: Vec<(String, f64)>,
}

impl DataReport {
    /// Parses a response body.
    ///
    /// Scalar members of the `device` object and scalar members at the top
    /// level are all collected as candidate sensor values, ordered by key.
    /// Booleans become `0.0` / `1.0`. Strings, arrays and nulls are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` for malformed JSON and
    /// `ParseError::UnexpectedFormat` if the document is not an object.
    pub fn parse(body: &str) -> Result<Self, ParseError> {
        let root: Value = serde_json::from_str(body)?;
        let Value::Object(root) = root else {
            return Err(ParseError::UnexpectedFormat(format!(
                "expected a JSON object, got {}",
                type_name(&root)
            )));
        };

        let mut report = Self::default();
        for (key, value) in &root {
            if key == DEVICE_KEY {
                if let Value::Object(device) = value {
                    report.device = parse_device(device);
                    collect_scalars(device, &mut report.values);
                } else {
                    tracing::warn!(kind = type_name(value), "device member is not an object");
                }
            } else if let Some(number) = scalar(value) {
                report.values.push((key.clone(), number));
            }
        }
        Ok(report)
    }

    /// Returns the operating state fields.
    #[must_use]
    pub fn device(&self) -> &DeviceReport {
        &self.device
    }

    /// Returns all scalar key/value pairs that may match a sensor.
    #[must_use]
    pub fn values(&self) -> &[(String, f64)] {
        &self.values
    }
}

fn parse_device(device: &Map<String, Value>) -> DeviceReport {
    let int = |key: &str| device.get(key).and_then(integer);
    let flag = |key: &str| int(key).map(|v| v > 0);
    DeviceReport {
        humidity: int("hum"),
        temperature: int("temp"),
        target_humidity: int("humt"),
        auto_mode: flag("auto"),
        sleep_mode: flag("sleep"),
        fan: int("fan"),
    }
}

fn collect_scalars(object: &Map<String, Value>, out: &mut Vec<(String, f64)>) {
    out.extend(
        object
            .iter()
            .filter_map(|(key, value)| scalar(value).map(|v| (key.clone(), v))),
    );
}

#[allow(clippy::cast_possible_truncation)]
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }
}

fn scalar(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_device_object() {
        let body = r#"{"device":{"hum":45,"temp":22,"humt":50,"auto":1,"sleep":0,"fan":3}}"#;
        let report = DataReport::parse(body).unwrap();
        assert_eq!(
            *report.device(),
            DeviceReport {
                humidity: Some(45),
                temperature: Some(22),
                target_humidity: Some(50),
                auto_mode: Some(true),
                sleep_mode: Some(false),
                fan: Some(3),
            }
        );
        assert_eq!(report.values().len(), 6);
    }

    #[test]
    fn partial_device_object_leaves_fields_unset() {
        let report = DataReport::parse(r#"{"device":{"fan":1}}"#).unwrap();
        assert_eq!(report.device().fan, Some(1));
        assert_eq!(report.device().humidity, None);
        assert_eq!(report.device().sleep_mode, None);
    }

    #[test]
    fn boolean_flags_accepted() {
        let report = DataReport::parse(r#"{"device":{"auto":true,"sleep":false}}"#).unwrap();
        assert_eq!(report.device().auto_mode, Some(true));
        assert_eq!(report.device().sleep_mode, Some(false));
    }

    #[test]
    fn top_level_scalars_collected() {
        let report =
            DataReport::parse(r#"{"waterlevel":2,"cleaning":false,"version":"1.2","x":null}"#)
                .unwrap();
        assert_eq!(
            report.values(),
            &[("cleaning".to_string(), 0.0), ("waterlevel".to_string(), 2.0)]
        );
    }

    #[test]
    fn malformed_json_is_error() {
        assert!(matches!(
            DataReport::parse("{\"device\":"),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn non_object_is_error() {
        assert!(matches!(
            DataReport::parse("[1,2]"),
            Err(ParseError::UnexpectedFormat(_))
        ));
    }
}
