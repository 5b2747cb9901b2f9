use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Runtime configuration (environment driven)
// ---------------------------------------------------------------------------

pub const DEFAULT_API_BASE: &str = "https://aviationweather.gov/api/data";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

pub const ENV_API_BASE: &str = "AWC_BASE";
pub const ENV_TIMEOUT_SECS: &str = "AWC_TIMEOUT_SECS";
pub const ENV_OFFLINE: &str = "AWC_OFFLINE";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the advisory data API, without trailing `/`.
    pub api_base: String,
    pub request_timeout: Duration,
    /// No network fetching; collections only come from files.
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            offline: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; unset or blank keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Config::default();

        if let Some(base) = get(ENV_API_BASE) {
            config.api_base = base.trim_end_matches('/').to_string();
        }

        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_TIMEOUT_SECS,
                    value: raw.clone(),
                    reason: "expected a positive number of seconds",
                })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = get(ENV_OFFLINE) {
            config.offline = matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }

        Ok(config)
    }
}
