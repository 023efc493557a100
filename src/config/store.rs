// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reading and atomically replacing the configuration file.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::{ConfigFile, LoadedConfig};
use crate::error::ConfigError;

/// Location of the configuration file.
///
/// # Examples
///
/// ```no_run
/// use venta_vdc::config::ConfigStore;
///
/// let store = ConfigStore::new("venta.toml");
/// let loaded = store.load(chrono::Utc::now())?;
/// println!("bridging {}", loaded.profile.id());
/// # Ok::<(), venta_vdc::error::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the configuration file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the temporary file written before the rename.
    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".new");
        PathBuf::from(name)
    }

    /// Reads and parses the file without validating it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file does not exist,
    /// `ConfigError::NotARegularFile` for directories and other special
    /// files, `ConfigError::Io` for read failures and `ConfigError::Syntax`
    /// for invalid TOML.
    pub fn read(&self) -> Result<ConfigFile, ConfigError> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };
        if !metadata.is_file() {
            return Err(ConfigError::NotARegularFile(self.path.clone()));
        }

        let text = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Reads and validates the file.
    ///
    /// `loaded_at` is the reference time for the age of sensors that have
    /// not been polled yet.
    ///
    /// # Errors
    ///
    /// Any error from [`read`](Self::read) or
    /// [`ConfigFile::into_loaded`].
    pub fn load(&self, loaded_at: DateTime<Utc>) -> Result<LoadedConfig, ConfigError> {
        let file = self.read()?;
        tracing::debug!(path = %self.path.display(), "Configuration read");
        file.into_loaded(loaded_at)
    }

    /// Replaces the file with `file`.
    ///
    /// The contents go to `<path>.new` first, which is then renamed over the
    /// target. A failed write removes the temporary file and leaves the
    /// previous configuration in place.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Serialize` or `ConfigError::Io`.
    pub fn save(&self, file: &ConfigFile) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(file)?;
        let temp = self.temp_path();

        if let Err(e) = fs::write(&temp, text) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        tracing::debug!(path = %self.path.display(), "Configuration written");
        Ok(())
    }

    /// Writes [`ConfigFile::template`] to the path.
    ///
    /// # Errors
    ///
    /// Same as [`save`](Self::save).
    pub fn write_template(&self) -> Result<(), ConfigError> {
        self.save(&ConfigFile::template())
    }
}
