use std::env::var;
use std::time::Duration;

use dotenvy::dotenv;

use crate::refresh::RefreshSettings;

/// Application configuration with environment variable overrides
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the published snapshot document
    /// Env: DATA_URL (required at startup)
    pub data_url: Option<String>,

    /// Server port
    /// Env: PORT (default: 3000)
    pub port: u16,

    /// Whether the snapshot is refreshed automatically
    /// Env: AUTO_REFRESH (default: true)
    pub auto_refresh: bool,

    /// How old the published document must be before it is fetched again
    /// Env: HOURS_TO_WAIT_AFTER_UPDATE (default: 1)
    pub wait_after_update: Duration,

    /// Minimum gap between two fetch attempts
    /// Env: MINUTES_BETWEEN_REFRESHES (default: 5)
    pub wait_between_refreshes: Duration,

    /// How often the refresh gate is checked
    /// Env: POLL_INTERVAL_SECS (default: 30)
    pub poll_interval: Duration,

    /// Timeout for fetching the document
    /// Env: FETCH_TIMEOUT_SECS (default: 30)
    pub fetch_timeout: Duration,

    /// Request timeout in seconds
    /// Env: REQUEST_TIMEOUT_SECS (default: 30)
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let _ = dotenv(); //for debugging mostly
        let defaults = Self::default();
        Self {
            data_url: var("DATA_URL").ok(),
            port: env_or_default("PORT", defaults.port),
            auto_refresh: env_or_default("AUTO_REFRESH", defaults.auto_refresh),
            wait_after_update: env_duration("HOURS_TO_WAIT_AFTER_UPDATE", 3600.0)
                .unwrap_or(defaults.wait_after_update),
            wait_between_refreshes: env_duration("MINUTES_BETWEEN_REFRESHES", 60.0)
                .unwrap_or(defaults.wait_between_refreshes),
            poll_interval: env_period("POLL_INTERVAL_SECS")
                .unwrap_or(defaults.poll_interval),
            fetch_timeout: env_period("FETCH_TIMEOUT_SECS")
                .unwrap_or(defaults.fetch_timeout),
            request_timeout: env_period("REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout),
        }
    }

    /// Create configuration with all default values
    pub fn default() -> Self {
        Self {
            data_url: None,
            port: 3000,
            auto_refresh: true,
            wait_after_update: Duration::from_secs(60 * 60),
            wait_between_refreshes: Duration::from_secs(5 * 60),
            poll_interval: Duration::from_secs(30),
            fetch_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn refresh_settings(&self) -> RefreshSettings {
        RefreshSettings {
            auto_refresh: self.auto_refresh,
            wait_after_update: self.wait_after_update,
            wait_between_refreshes: self.wait_between_refreshes,
            poll_interval: self.poll_interval,
        }
    }
}

/// Parse environment variable or return default value
fn env_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    var(key)
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(default)
}

/// Parse a fractional environment variable as a duration, `unit_secs` seconds per unit
fn env_duration(key: &str, unit_secs: f64) -> Option<Duration> {
    let amount: f64 = var(key).ok()?.parse().ok()?;
    Duration::try_from_secs_f64(amount * unit_secs).ok()
}

/// Like [`env_duration`] in seconds, but zero is rejected
fn env_period(key: &str) -> Option<Duration> {
    env_duration(key, 1.0).filter(|period| !period.is_zero())
}
