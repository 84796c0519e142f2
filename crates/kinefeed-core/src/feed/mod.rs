//! Live Sample Feed
//!
//! Streams joint-angle packets from a telemetry endpoint and keeps a rolling
//! window of the most recent samples for a single recording.
//!
//! A feed is opened per recording identifier. Every inbound frame is decoded,
//! filtered by relevance, stamped and appended to a fixed-capacity buffer; the
//! registered consumer then receives an immutable snapshot of the window.

mod buffer;
mod config;
mod error;
mod filter;
mod handle;
mod live;
mod packet;
mod processor;
mod state;
pub mod transport;

pub use buffer::{FeedBuffer, FeedSnapshot};
pub use config::{FeedConfig, ReconnectPolicy, CONFIG_URL_ENV};
pub use error::{FeedError, PacketError};
pub use filter::{RecordingFilter, LIVE_CHANNEL};
pub use handle::{open, open_with, FeedHandle, FeedUpdates};
pub use live::LiveSampleFeed;
pub use packet::{Packet, Sample};
pub use processor::{FeedProcessor, FeedStats, Ingest};
pub use state::FeedState;
pub use transport::{Connector, Frame, FrameStream, WebSocketConnector};

/// Default telemetry endpoint
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws";

/// Default number of samples kept in the rolling window
pub const DEFAULT_CAPACITY: usize = 300;

/// Time step used when a packet carries no timestamp
pub const SYNTHETIC_STEP_S: f64 = 0.1;

/// Default timeout for establishing the streaming connection in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;
