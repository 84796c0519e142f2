//! Feed configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::{
    FeedError, DEFAULT_CAPACITY, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_WS_URL, SYNTHETIC_STEP_S,
};

/// Environment variable overriding the telemetry endpoint
pub const CONFIG_URL_ENV: &str = "KINEFEED_WS_URL";

/// Feed configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Telemetry endpoint URL
    pub url: String,
    /// Rolling window size in samples
    pub capacity: usize,
    /// Time step used to stamp packets without `time_s`
    pub synthetic_step_s: f64,
    /// Connect timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Behavior after a mid-stream drop
    pub reconnect: ReconnectPolicy,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WS_URL.to_string(),
            capacity: DEFAULT_CAPACITY,
            synthetic_step_s: SYNTHETIC_STEP_S,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl FeedConfig {
    /// Defaults with the endpoint taken from `KINEFEED_WS_URL` when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load a JSON config file; missing fields keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FeedError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: FeedConfig = serde_json::from_str(&content).map_err(|e| {
            FeedError::Config(format!("{}: {}", path.as_ref().display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Override the endpoint from `KINEFEED_WS_URL`
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(CONFIG_URL_ENV) {
            if !url.trim().is_empty() {
                self.url = url;
            }
        }
    }

    /// Use a different endpoint
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Use a different window size
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Use a different reconnect policy
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Connect timeout as a duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Check values that would make the feed unusable
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.url.trim().is_empty() {
            return Err(FeedError::Config("url must not be empty".into()));
        }
        if self.capacity == 0 {
            return Err(FeedError::Config("capacity must be at least 1".into()));
        }
        if !self.synthetic_step_s.is_finite() || self.synthetic_step_s < 0.0 {
            return Err(FeedError::Config(format!(
                "synthetic_step_s must be a non-negative number, got {}",
                self.synthetic_step_s
            )));
        }
        if self.connect_timeout_ms == 0 {
            return Err(FeedError::Config("connect_timeout_ms must be positive".into()));
        }
        Ok(())
    }
}

/// Reconnection after the remote end drops an open connection
///
/// Disabled by default: a dropped connection leaves the feed `Closed` with its
/// window frozen. When enabled, the feed waits with exponential backoff and
/// retries up to `max_retries` consecutive times. Initial connection failures
/// are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    /// Retry after mid-stream drops
    pub auto_reconnect: bool,
    /// Consecutive attempts before giving up
    pub max_retries: u32,
    /// Delay before the first attempt in milliseconds
    pub backoff_ms: u64,
    /// Upper bound for the delay in milliseconds
    pub max_backoff_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            auto_reconnect: false,
            max_retries: 5,
            backoff_ms: 500,
            max_backoff_ms: 10_000,
        }
    }
}

impl ReconnectPolicy {
    /// Enabled policy with the given retry budget and base delay
    pub fn enabled(max_retries: u32, backoff_ms: u64) -> Self {
        Self {
            auto_reconnect: true,
            max_retries,
            backoff_ms,
            ..Self::default()
        }
    }

    /// Check whether another attempt is allowed after `attempt` retries
    pub fn should_retry(&self, attempt: u32) -> bool {
        self.auto_reconnect && attempt < self.max_retries
    }

    /// Delay before retry number `attempt` (zero based)
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt.min(32)).unwrap_or(u64::MAX);
        let ms = self
            .backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms.max(self.backoff_ms));
        Duration::from_millis(ms)
    }
}
