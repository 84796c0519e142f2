//! Packet relevance

use std::fmt;

use super::FeedError;

/// Identifier that subscribes to every packet regardless of its `id`
pub const LIVE_CHANNEL: &str = "live";

/// Decides which packets belong to the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingFilter {
    /// Wildcard: every packet is relevant
    Live,
    /// Only packets whose `id` equals this recording
    Recording(String),
}

impl RecordingFilter {
    /// Build a filter from a recording identifier
    pub fn new(recording_id: &str) -> Result<Self, FeedError> {
        if recording_id.trim().is_empty() {
            return Err(FeedError::InvalidRecordingId(recording_id.to_string()));
        }
        if recording_id == LIVE_CHANNEL {
            Ok(RecordingFilter::Live)
        } else {
            Ok(RecordingFilter::Recording(recording_id.to_string()))
        }
    }

    /// Check whether a packet carrying `packet_id` is relevant
    pub fn accepts(&self, packet_id: Option<&str>) -> bool {
        match self {
            RecordingFilter::Live => true,
            RecordingFilter::Recording(id) => packet_id == Some(id.as_str()),
        }
    }

    /// The identifier the filter was built from
    pub fn recording_id(&self) -> &str {
        match self {
            RecordingFilter::Live => LIVE_CHANNEL,
            RecordingFilter::Recording(id) => id,
        }
    }

    /// Check if this is the wildcard filter
    pub fn is_live(&self) -> bool {
        matches!(self, RecordingFilter::Live)
    }
}

impl fmt::Display for RecordingFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.recording_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_identifier_rejected() {
        assert!(matches!(
            RecordingFilter::new(""),
            Err(FeedError::InvalidRecordingId(_))
        ));
        assert!(RecordingFilter::new("   ").is_err());
    }

    #[test]
    fn test_recording_filter() {
        let filter = RecordingFilter::new("X").unwrap();
        assert!(filter.accepts(Some("X")));
        assert!(!filter.accepts(Some("Y")));
        assert!(!filter.accepts(Some("x")));
        assert!(!filter.accepts(None));
    }

    #[test]
    fn test_live_filter_accepts_everything() {
        let filter = RecordingFilter::new("live").unwrap();
        assert!(filter.is_live());
        assert!(filter.accepts(Some("X")));
        assert!(filter.accepts(None));
        assert_eq!(filter.to_string(), "live");
    }
}
