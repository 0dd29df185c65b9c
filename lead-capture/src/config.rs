//! Environment-based configuration.
//!
//! Every setting has a default, so an empty environment yields a working
//! local setup pointed at `http://localhost:5000`.
//!
//! # Example
//!
//! ```no_run
//! use lead_capture::config::Config;
//!
//! # fn main() -> Result<(), lead_capture::config::ConfigError> {
//! let config = Config::from_env()?;
//! println!("Analyzing via {}", config.analyze_url());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Base URL of the analysis service
pub const BASE_URL_VAR: &str = "LEAD_CAPTURE_BASE_URL";
/// Path of the analysis endpoint
pub const ANALYZE_PATH_VAR: &str = "LEAD_CAPTURE_ANALYZE_PATH";
/// Name of the CSRF cookie
pub const CSRF_COOKIE_VAR: &str = "LEAD_CAPTURE_CSRF_COOKIE";
/// Request timeout in seconds
pub const REQUEST_TIMEOUT_VAR: &str = "LEAD_CAPTURE_REQUEST_TIMEOUT_SECS";
/// Alert fade delay in milliseconds
pub const ALERT_FADE_VAR: &str = "LEAD_CAPTURE_ALERT_FADE_MS";
/// Alert removal delay in milliseconds
pub const ALERT_REMOVE_VAR: &str = "LEAD_CAPTURE_ALERT_REMOVE_MS";
/// Drop responses from superseded requests
pub const FENCE_VAR: &str = "LEAD_CAPTURE_FENCE_STALE_RESPONSES";
/// Recover JSON objects wrapped in surrounding text
pub const LENIENT_JSON_VAR: &str = "LEAD_CAPTURE_LENIENT_JSON";
/// Use the scripted demo client instead of HTTP
pub const OFFLINE_VAR: &str = "LEAD_CAPTURE_OFFLINE";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable was set to a value that does not parse
    #[error("invalid value for {key}: {value:?}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Offending value
        value: String,
    },

    /// Values parsed but are unusable together
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

/// Lead capture configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Analysis service base URL, without trailing slash
    pub base_url: String,
    /// Analysis endpoint path
    pub analyze_path: String,
    /// Cookie holding the CSRF token
    pub csrf_cookie: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Delay before an alert fades, in milliseconds
    pub alert_fade_ms: u64,
    /// Delay between fade and removal, in milliseconds
    pub alert_remove_ms: u64,
    /// Drop responses that belong to a superseded submission
    pub fence_stale_responses: bool,
    /// Retry parsing on the outermost `{...}` span of the body
    pub lenient_json: bool,
    /// Serve the canned demo payload instead of calling the service
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            analyze_path: "/api/analyze-email".to_string(),
            csrf_cookie: "csrf_token".to_string(),
            request_timeout_secs: 60,
            alert_fade_ms: 5000,
            alert_remove_ms: 300,
            fence_stale_responses: false,
            lenient_json: false,
            offline: false,
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for unparseable values and
    /// [`ConfigError::Validation`] for unusable combinations.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        let config = Self {
            base_url: text(BASE_URL_VAR, defaults.base_url)
                .trim_end_matches('/')
                .to_string(),
            analyze_path: text(ANALYZE_PATH_VAR, defaults.analyze_path),
            csrf_cookie: text(CSRF_COOKIE_VAR, defaults.csrf_cookie),
            request_timeout_secs: parsed(&lookup, REQUEST_TIMEOUT_VAR, defaults.request_timeout_secs)?,
            alert_fade_ms: parsed(&lookup, ALERT_FADE_VAR, defaults.alert_fade_ms)?,
            alert_remove_ms: parsed(&lookup, ALERT_REMOVE_VAR, defaults.alert_remove_ms)?,
            fence_stale_responses: flag(&lookup, FENCE_VAR, defaults.fence_stale_responses)?,
            lenient_json: flag(&lookup, LENIENT_JSON_VAR, defaults.lenient_json)?,
            offline: flag(&lookup, OFFLINE_VAR, defaults.offline)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if any value is unusable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "base_url must be an http(s) URL, got {}",
                self.base_url
            )));
        }
        if !self.analyze_path.starts_with('/') {
            return Err(ConfigError::Validation(
                "analyze_path must start with '/'".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "request_timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Full URL of the analysis endpoint
    #[must_use]
    pub fn analyze_url(&self) -> String {
        format!("{}{}", self.base_url, self.analyze_path)
    }

    /// Request timeout as Duration
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Alert fade delay as Duration
    #[must_use]
    pub const fn alert_fade(&self) -> Duration {
        Duration::from_millis(self.alert_fade_ms)
    }

    /// Alert removal delay as Duration
    #[must_use]
    pub const fn alert_remove(&self) -> Duration {
        Duration::from_millis(self.alert_remove_ms)
    }
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw })
        },
        _ => Ok(default),
    }
}

fn flag<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(default),
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.analyze_url(), "http://localhost:5000/api/analyze-email");
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.alert_fade(), Duration::from_millis(5000));
        assert_eq!(config.alert_remove(), Duration::from_millis(300));
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            (BASE_URL_VAR, "https://leads.example.com/"),
            (REQUEST_TIMEOUT_VAR, " 5 "),
            (FENCE_VAR, "TRUE"),
            (OFFLINE_VAR, "1"),
        ])
        .unwrap();

        assert_eq!(config.analyze_url(), "https://leads.example.com/api/analyze-email");
        assert_eq!(config.request_timeout_secs, 5);
        assert!(config.fence_stale_responses);
        assert!(config.offline);
        assert!(!config.lenient_json);
    }

    #[test]
    fn malformed_number_is_invalid() {
        let error = load(&[(ALERT_FADE_VAR, "soon")]).unwrap_err();
        assert_eq!(
            error,
            ConfigError::Invalid {
                key: ALERT_FADE_VAR,
                value: "soon".to_string()
            }
        );
    }

    #[test]
    fn malformed_flag_is_invalid() {
        let error = load(&[(LENIENT_JSON_VAR, "maybe")]).unwrap_err();
        assert!(matches!(error, ConfigError::Invalid { key: LENIENT_JSON_VAR, .. }));
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let error = load(&[(REQUEST_TIMEOUT_VAR, "0")]).unwrap_err();
        assert!(matches!(error, ConfigError::Validation(_)));
    }

    #[test]
    fn base_url_must_be_http() {
        assert!(load(&[(BASE_URL_VAR, "ftp://x")]).is_err());
        assert!(load(&[(ANALYZE_PATH_VAR, "api")]).is_err());
    }
}
