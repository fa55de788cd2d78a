//! Runtime configuration from environment variables (and `.env`)
//!
//! - `VIGIL_API_URL`: backend base URL
//! - `VIGIL_DB_PATH`: SQLite file for drafts
//! - `VIGIL_HTTP_TIMEOUT_SECS`: per-request timeout
//! - `VIGIL_USER_ID`: user id sent with saved workouts
//! - `VIGIL_LOG_DIR`: where the workout screen writes its log file

use std::env;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://no-pain-no-main.azurewebsites.net";
pub const DEFAULT_DB_PATH: &str = "vigil.db";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub db_path: String,
    pub http_timeout: Duration,
    pub user_id: i64,
    pub log_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            db_path: DEFAULT_DB_PATH.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_id: 1,
            log_dir: ".".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any variable source; unset variables keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup("VIGIL_API_URL") {
            config.api_url = url;
        }
        if let Some(path) = lookup("VIGIL_DB_PATH") {
            config.db_path = path;
        }
        if let Some(dir) = lookup("VIGIL_LOG_DIR") {
            config.log_dir = dir;
        }
        if let Some(raw) = lookup("VIGIL_HTTP_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::Invalid {
                    var: "VIGIL_HTTP_TIMEOUT_SECS",
                    expected: "a positive number of seconds",
                    value: raw.clone(),
                })?;
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup("VIGIL_USER_ID") {
            config.user_id = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "VIGIL_USER_ID",
                expected: "an integer",
                value: raw.clone(),
            })?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("VIGIL_API_URL", "http://localhost:8080"),
            ("VIGIL_HTTP_TIMEOUT_SECS", "3"),
            ("VIGIL_USER_ID", "42"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(config.user_id, 42);
    }

    #[test]
    fn test_invalid_timeout() {
        let err = Config::from_lookup(lookup(&[("VIGIL_HTTP_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "VIGIL_HTTP_TIMEOUT_SECS", .. }));
    }

    #[test]
    fn test_invalid_user_id() {
        let err = Config::from_lookup(lookup(&[("VIGIL_USER_ID", "me")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "VIGIL_USER_ID must be an integer, got \"me\""
        );
    }
}
