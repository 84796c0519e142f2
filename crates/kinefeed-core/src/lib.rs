//! # Kinefeed Core Library
//!
//! Core functionality for the kinefeed live joint-angle feed.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Live sample feed over WebSocket with a fixed-size rolling window
//! - Relevance filtering by recording identifier
//! - Optional reconnection with exponential backoff
//! - Recording API client for the static session chart
//! - CSV export and replay of angle logs
//! - Simulated knee-angle source for demo mode
//!
//! ## Example
//!
//! ```rust,ignore
//! use kinefeed_core::feed::{self, FeedConfig};
//!
//! // Subscribe to every packet on the endpoint
//! let handle = feed::open("live", FeedConfig::from_env())?;
//!
//! handle.on_update(|snapshot| {
//!     if let Some(last) = snapshot.last() {
//!         println!("{:.1}s {:.1}°", last.time_s, last.angle_deg);
//!     }
//! });
//!
//! // Later
//! handle.close();
//! ```

pub mod api;
pub mod datalog;
pub mod demo;
pub mod feed;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{Recording, RecordingClient};
    pub use crate::datalog::{write_csv, ReplayConnector};
    pub use crate::demo::{DemoConnector, DemoSimulator};
    pub use crate::feed::{
        open, open_with, Connector, FeedConfig, FeedError, FeedHandle, FeedSnapshot, FeedState,
        LiveSampleFeed, Packet, ReconnectPolicy, Sample,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
