//! Runtime configuration read from the environment.
//!
//! All variables are optional:
//!
//! | Variable                 | Default                    |
//! |--------------------------|----------------------------|
//! | `LOG_FILE_PATH`          | `logs/sales_summary.log`   |
//! | `SALES_MAX_UPLOAD_BYTES` | `15728640` (15 MiB)        |
//! | `SALES_RETRY_ATTEMPTS`   | `5`                        |
//! | `SALES_RETRY_DELAY_MS`   | `2000`                     |
//! | `SALES_TIMEOUT_SECS`     | `30`                       |
//! | `SALES_RETRY_JITTER`     | `true`                     |

use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

use crate::policy::RetryPolicy;
use crate::validate::UploadLimits;

pub const DEFAULT_LOG_FILE_PATH: &str = "logs/sales_summary.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub log_file_path: String,
    pub upload: UploadLimits,
    pub policy: RetryPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_file_path: DEFAULT_LOG_FILE_PATH.to_string(),
            upload: UploadLimits::default(),
            policy: RetryPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to defaults
    /// for missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_file_path = lookup("LOG_FILE_PATH").unwrap_or(defaults.log_file_path);
        let max_bytes = parse_var(&lookup, "SALES_MAX_UPLOAD_BYTES", defaults.upload.max_bytes)?;
        let max_retries = parse_var(&lookup, "SALES_RETRY_ATTEMPTS", defaults.policy.max_retries)?;
        let delay_ms = parse_var(
            &lookup,
            "SALES_RETRY_DELAY_MS",
            defaults.policy.base_delay.as_millis() as u64,
        )?;
        let timeout_secs = parse_var(
            &lookup,
            "SALES_TIMEOUT_SECS",
            defaults.policy.timeout.as_secs(),
        )?;
        let jitter = parse_var(&lookup, "SALES_RETRY_JITTER", defaults.policy.jitter)?;

        Ok(Self {
            log_file_path,
            upload: UploadLimits { max_bytes },
            policy: RetryPolicy {
                max_retries,
                base_delay: Duration::from_millis(delay_ms),
                timeout: Duration::from_secs(timeout_secs),
                jitter,
            },
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value `{raw}` for {key}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.upload.max_bytes, 15 * 1024 * 1024);
        assert_eq!(config.policy.max_retries, 5);
        assert_eq!(config.policy.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("LOG_FILE_PATH", "/tmp/summary.log"),
            ("SALES_MAX_UPLOAD_BYTES", "1024"),
            ("SALES_RETRY_ATTEMPTS", "0"),
            ("SALES_RETRY_DELAY_MS", " 250 "),
            ("SALES_TIMEOUT_SECS", "5"),
            ("SALES_RETRY_JITTER", "false"),
        ]))
        .unwrap();

        assert_eq!(config.log_file_path, "/tmp/summary.log");
        assert_eq!(config.upload.max_bytes, 1024);
        assert_eq!(config.policy.max_retries, 0);
        assert_eq!(config.policy.base_delay, Duration::from_millis(250));
        assert_eq!(config.policy.timeout, Duration::from_secs(5));
        assert!(!config.policy.jitter);
    }

    #[test]
    fn test_invalid_value_names_variable() {
        let err = AppConfig::from_lookup(lookup_from(&[("SALES_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("SALES_TIMEOUT_SECS"));
    }
}
