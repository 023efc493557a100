// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for the appliance's local JSON API.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::error::ProtocolError;

/// Statuses whose response is dropped as if the appliance never answered.
const IGNORED_STATUSES: [StatusCode; 3] = [
    StatusCode::FORBIDDEN,
    StatusCode::NOT_FOUND,
    StatusCode::SERVICE_UNAVAILABLE,
];

// ============================================================================
// HttpConfig
// ============================================================================

/// Connection parameters of the appliance.
///
/// The appliance API is plain, unauthenticated HTTP on the local network.
/// Each request is independent, there is no session to keep alive.
///
/// # Examples
///
/// ```
/// use venta_vdc::protocol::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new("192.168.1.50");
/// assert_eq!(config.base_url(), "http://192.168.1.50");
///
/// let config = HttpConfig::new("192.168.1.50")
///     .with_port(8080)
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.base_url(), "http://192.168.1.50:8080");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    host: String,
    port: u16,
    timeout: Duration,
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Upper bound for a single request, connect included.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(42);

    /// Creates a configuration for the given host name or IP address.
    ///
    /// A value that already starts with `http://` or `https://` is used as
    /// the base URL verbatim and the port setting is ignored.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the base URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            return host.to_string();
        }
        if self.port == Self::DEFAULT_PORT {
            format!("http://{host}")
        } else {
            format!("http://{host}:{}", self.port)
        }
    }

    /// Creates an [`HttpClient`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::InvalidAddress` for an empty host, or
    /// `ProtocolError::Http` if the client cannot be created.
    pub fn into_client(self) -> Result<HttpClient, ProtocolError> {
        if self.host.trim().is_empty() {
            return Err(ProtocolError::InvalidAddress(
                "appliance address is empty".to_string(),
            ));
        }
        let base_url = self.base_url();
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpClient { base_url, client })
    }
}

// ============================================================================
// HttpClient
// ============================================================================

/// HTTP client bound to one appliance.
///
/// Every call is a `POST`. Statuses 403, 404 and 503 are reported as
/// [`ProtocolError::IgnoredStatus`] so callers treat them like a connection
/// failure. Any other non-success status is [`ProtocolError::Status`].
///
/// # Examples
///
/// ```no_run
/// use venta_vdc::protocol::HttpConfig;
///
/// # async fn example() -> Result<(), venta_vdc::error::ProtocolError> {
/// let client = HttpConfig::new("192.168.1.50").into_client()?;
/// let body = client.post("/api/data", None).await?;
/// println!("{body}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Returns the base URL of the appliance.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Posts to `path`, with `body` as JSON if given, and returns the
    /// response body.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Http` on connect, timeout or read failure and
    /// `ProtocolError::IgnoredStatus` / `ProtocolError::Status` for
    /// non-success statuses.
    pub async fn post(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<String, ProtocolError> {
        let url = self.build_url(path);

        tracing::debug!(url = %url, body = ?body, "Sending HTTP request");

        let mut request = self.client.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(ProtocolError::Http)?;

        let status = response.status();
        if IGNORED_STATUSES.contains(&status) {
            return Err(ProtocolError::IgnoredStatus(status.as_u16()));
        }
        if !status.is_success() {
            return Err(ProtocolError::Status(status.as_u16()));
        }

        let text = response.text().await.map_err(ProtocolError::Http)?;

        tracing::debug!(body = %text, "Received HTTP response");

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_config_default_values() {
        let config = HttpConfig::new("192.168.1.50");
        assert_eq!(config.host(), "192.168.1.50");
        assert_eq!(config.port(), 80);
        assert_eq!(config.timeout(), Duration::from_secs(42));
    }

    #[test]
    fn base_url_with_custom_port() {
        let config = HttpConfig::new("venta.local").with_port(8080);
        assert_eq!(config.base_url(), "http://venta.local:8080");
    }

    #[test]
    fn base_url_with_scheme_is_kept() {
        let config = HttpConfig::new("http://127.0.0.1:40000/").with_port(8080);
        assert_eq!(config.base_url(), "http://127.0.0.1:40000");
    }

    #[test]
    fn build_url_joins_paths() {
        let client = HttpConfig::new("10.0.0.2").into_client().unwrap();
        assert_eq!(client.build_url("/api/data"), "http://10.0.0.2/api/data");
        assert_eq!(client.build_url("api/btn"), "http://10.0.0.2/api/btn");
    }

    #[test]
    fn empty_host_rejected() {
        let result = HttpConfig::new("  ").into_client();
        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }
}
