//! Angle Logs
//!
//! Exports feed snapshots as CSV and replays recorded CSV files through the
//! feed. The layout matches the angle files written by the recording backend:
//!
//! ```text
//! time_s,angle_deg
//! 0.0,10
//! 0.1,11
//! ```

mod format;
mod playback;

pub use format::{parse_csv, read_csv, write_csv, DatalogError, CSV_HEADER};
pub use playback::ReplayConnector;
