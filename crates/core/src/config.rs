//! Lookup runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the
//! HTTP client. Binaries read the environment; the core never does, so queries
//! issued later cannot observe a half-changed environment.

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::{LookupError, LookupResult};
use std::time::Duration;

/// Environment variable naming the lookup service base URL.
pub const BASE_URL_ENV: &str = "LOOKUP_API_BASE_URL";
/// Environment variable overriding the connect timeout, in seconds.
pub const CONNECT_TIMEOUT_ENV: &str = "LOOKUP_CONNECT_TIMEOUT_SECS";
/// Environment variable overriding the request timeout, in seconds.
pub const REQUEST_TIMEOUT_ENV: &str = "LOOKUP_REQUEST_TIMEOUT_SECS";

/// Client configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct LookupConfig {
    base_url: String,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl LookupConfig {
    /// Create a new `LookupConfig`.
    ///
    /// The base URL must be an absolute `http` or `https` URL. A trailing slash is
    /// dropped so endpoint paths can be appended directly.
    pub fn new(
        base_url: &str,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> LookupResult<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(LookupError::InvalidConfig(
                "base URL cannot be empty".into(),
            ));
        }

        let parsed = reqwest::Url::parse(trimmed)
            .map_err(|e| LookupError::InvalidConfig(format!("invalid base URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LookupError::InvalidConfig(format!(
                "base URL must use http or https, got {}",
                parsed.scheme()
            )));
        }

        if connect_timeout.is_zero() || request_timeout.is_zero() {
            return Err(LookupError::InvalidConfig(
                "timeouts must be greater than zero".into(),
            ));
        }

        Ok(Self {
            base_url: trimmed.to_string(),
            connect_timeout,
            request_timeout,
        })
    }

    /// Build a configuration from raw (usually environment) values.
    ///
    /// `None` or blank values fall back to the defaults.
    pub fn from_values(
        base_url: Option<String>,
        connect_timeout_secs: Option<String>,
        request_timeout_secs: Option<String>,
    ) -> LookupResult<Self> {
        let base_url = non_blank(base_url).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let connect = secs_from_value(connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS)?;
        let request = secs_from_value(request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS)?;

        Self::new(
            &base_url,
            Duration::from_secs(connect),
            Duration::from_secs(request),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Full URL of an endpoint path such as `/paciente`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn secs_from_value(value: Option<String>, default: u64) -> LookupResult<u64> {
    match non_blank(value) {
        None => Ok(default),
        Some(v) => v
            .parse::<u64>()
            .map_err(|_| LookupError::InvalidConfig(format!("invalid timeout seconds: {v}"))),
    }
}
