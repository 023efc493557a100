// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the Venta vDC bridge.
//!
//! Failures are grouped by how the bridge reacts to them:
//!
//! - [`ProtocolError`] and [`ParseError`] happen while talking to the
//!   appliance. They are logged and turned into a delayed retry.
//! - [`Error::CommandFailed`] means a button press never reached the
//!   appliance.
//! - [`ConfigError`] is only fatal while the process starts up.
//! - [`BusError`] comes from the bus transport and is logged only.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Button;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A value was outside its allowed range.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The appliance could not be reached or answered with an unusable status.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The appliance answered with a body that could not be decoded.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A button press could not be delivered to the appliance.
    #[error("sending button {button} failed: {source}")]
    CommandFailed {
        /// The button that was pressed.
        button: Button,
        /// The underlying transport failure.
        #[source]
        source: ProtocolError,
    },

    /// The configuration profile is unusable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The bus transport rejected a call.
    #[error("bus error: {0}")]
    Bus(#[from] BusError),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Appliance unreachable, timed out or answered with an ignored status.
    Connect,
    /// Malformed appliance response.
    Parse,
    /// A control command could not be sent.
    ConfigChange,
    /// Missing or invalid configuration.
    BadConfig,
    /// Bus transport failure.
    Bus,
}

impl Error {
    /// Returns the class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Value(_) | Self::Config(_) => ErrorKind::BadConfig,
            Self::Protocol(_) => ErrorKind::Connect,
            Self::Parse(_) => ErrorKind::Parse,
            Self::CommandFailed { .. } => ErrorKind::ConfigChange,
            Self::Bus(_) => ErrorKind::Bus,
        }
    }

    /// Returns `true` if the process must not continue after this error.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::BadConfig
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The actual value that was provided.
        actual: i64,
    },

    /// A dSUID string is not 34 hexadecimal digits.
    #[error("invalid dSUID: {0}")]
    InvalidDsUid(String),
}

/// Errors related to HTTP communication with the appliance.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The appliance answered with a status whose body is never used.
    #[error("appliance answered HTTP {0}, ignoring response")]
    IgnoredStatus(u16),

    /// The appliance answered with some other non-success status.
    #[error("appliance answered HTTP {0}")]
    Status(u16),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors related to decoding appliance responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is valid JSON but not shaped as expected.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Errors related to loading or saving the configuration profile.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file {} not found", .0.display())]
    NotFound(PathBuf),

    /// The configuration path exists but is not a regular file.
    #[error("configuration file {} is not a regular file", .0.display())]
    NotARegularFile(PathBuf),

    /// Reading or writing the file failed.
    #[error("configuration I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for the profile layout.
    #[error("configuration syntax error: {0}")]
    Syntax(#[from] toml::de::Error),

    /// The profile could not be serialized.
    #[error("configuration serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A mandatory key is absent.
    #[error("mandatory parameter '{0}' is not set")]
    MissingField(&'static str),

    /// A key holds a value outside its allowed range.
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        /// The offending key.
        field: String,
        /// Description of the problem.
        message: String,
    },

    /// Two sensors share the same name.
    #[error("sensor name '{0}' is configured more than once")]
    DuplicateSensor(String),
}

/// Errors reported by a bus transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// No session with the bus controller exists.
    #[error("no bus session")]
    NoSession,

    /// The transport refused the call.
    #[error("rejected by transport: {0}")]
    Rejected(String),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
