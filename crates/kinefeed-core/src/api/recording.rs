use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ApiError, DEFAULT_API_BASE, DEFAULT_API_TIMEOUT_MS};
use crate::feed::Sample;

/// Environment variable overriding the backend base URL
pub const API_BASE_ENV: &str = "KINEFEED_API_BASE";

/// A stored motion-capture session
///
/// Only `times` and `angles` are needed for charting; the remaining fields
/// are carried through for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Recording id
    #[serde(default)]
    pub id: Option<String>,
    /// Owning patient
    #[serde(default)]
    pub patient_id: Option<String>,
    /// Session date (YYYY-MM-DD)
    #[serde(default)]
    pub date: Option<String>,
    /// Display label
    #[serde(default)]
    pub label: Option<String>,
    /// Sample times in seconds
    #[serde(default)]
    pub times: Vec<f64>,
    /// Angles in degrees, aligned with `times`; gaps are `null`
    #[serde(default)]
    pub angles: Vec<Option<f64>>,
    /// Precomputed session metrics, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Recording {
    /// Pair times with angles, skipping points without an angle
    pub fn chart_points(&self) -> Vec<Sample> {
        self.times
            .iter()
            .zip(self.angles.iter())
            .filter_map(|(&t, a)| a.map(|angle| Sample::new(t, angle)))
            .collect()
    }

    /// Check if there is nothing to chart
    pub fn is_empty(&self) -> bool {
        self.chart_points().is_empty()
    }
}

/// HTTP client for the recording endpoint
#[derive(Debug, Clone)]
pub struct RecordingClient {
    client: reqwest::Client,
    base_url: String,
}

impl RecordingClient {
    /// Create a client for `base_url` with the default timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Duration::from_millis(DEFAULT_API_TIMEOUT_MS))
    }

    /// Create a client with an explicit request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("kinefeed/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    /// Client for `KINEFEED_API_BASE`, falling back to the local backend
    pub fn from_env() -> Result<Self, ApiError> {
        let base = std::env::var(API_BASE_ENV)
            .ok()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self::new(base)
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a recording by id
    pub async fn fetch_recording(&self, id: &str) -> Result<Recording, ApiError> {
        if id.trim().is_empty() || id.contains('/') || id.contains('?') || id.contains('#') {
            return Err(ApiError::InvalidId(id.to_string()));
        }

        let url = format!("{}/recordings/{}", self.base_url, id);
        tracing::debug!(%url, "Fetching recording");

        let response = self.client.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(id.to_string()));
        }
        let recording = response.error_for_status()?.json::<Recording>().await?;
        Ok(recording)
    }
}
