//! Recording API
//!
//! Client for the clinic backend's recording endpoint. The live feed is shown
//! next to a static chart of the stored recording; this module fetches that
//! recording.
//!
//! ## Usage
//!
//! ```ignore
//! let client = RecordingClient::from_env()?;
//! let recording = client.fetch_recording("r1").await?;
//! for point in recording.chart_points() {
//!     println!("{:.1}s {:.1}°", point.time_s, point.angle_deg);
//! }
//! ```

mod error;
mod recording;

pub use error::ApiError;
pub use recording::{Recording, RecordingClient, API_BASE_ENV};

/// Default backend base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Default request timeout in milliseconds
pub const DEFAULT_API_TIMEOUT_MS: u64 = 6000;
