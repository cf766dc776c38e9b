//! Environment-driven settings.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file by the binary.

use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_ERGAST_BASE_URL: &str = "https://api.jolpi.ca/ergast/f1";
pub const DEFAULT_LOG_FILE_PATH: &str = "logs/f1_teammates.log";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub ergast_base_url: String,
    pub http_timeout: Duration,
    /// When set, sessions are read from this CSV directory by default.
    pub data_dir: Option<String>,
    pub log_file_path: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let http_timeout = match get("F1_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("F1_HTTP_TIMEOUT_SECS must be a number of seconds, got '{raw}'"))?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            ergast_base_url: get("ERGAST_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ERGAST_BASE_URL.to_string()),
            http_timeout: Duration::from_secs(http_timeout),
            data_dir: get("F1_DATA_DIR"),
            log_file_path: get("LOG_FILE_PATH").unwrap_or_else(|| DEFAULT_LOG_FILE_PATH.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.ergast_base_url, DEFAULT_ERGAST_BASE_URL);
        assert_eq!(s.http_timeout, Duration::from_secs(30));
        assert_eq!(s.data_dir, None);
        assert_eq!(s.log_file_path, DEFAULT_LOG_FILE_PATH);
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("ERGAST_BASE_URL", "http://localhost:8000/api/f1"),
            ("F1_HTTP_TIMEOUT_SECS", "5"),
            ("F1_DATA_DIR", "data"),
        ])
        .unwrap();
        assert_eq!(s.ergast_base_url, "http://localhost:8000/api/f1");
        assert_eq!(s.http_timeout, Duration::from_secs(5));
        assert_eq!(s.data_dir.as_deref(), Some("data"));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let s = settings(&[("F1_DATA_DIR", "  ")]).unwrap();
        assert_eq!(s.data_dir, None);
    }

    #[test]
    fn test_invalid_timeout() {
        assert!(settings(&[("F1_HTTP_TIMEOUT_SECS", "soon")]).is_err());
    }
}
