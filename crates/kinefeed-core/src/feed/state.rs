//! Feed lifecycle states

use serde::{Deserialize, Serialize};

/// Connection lifecycle of a feed handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeedState {
    /// Created, no connection attempt yet
    #[default]
    Idle,
    /// Handshake in progress (or waiting to reconnect)
    Connecting,
    /// Connected and processing packets
    Open,
    /// Closed by the consumer or by the remote end
    Closed,
    /// The connection could not be established
    Failed,
}

impl FeedState {
    /// Check if transition from current state to target state is valid
    pub fn can_transition_to(&self, target: FeedState) -> bool {
        use FeedState::*;

        matches!(
            (self, target),
            (Idle, Connecting)
                | (Idle, Closed)
                | (Connecting, Open)
                | (Connecting, Failed)
                | (Connecting, Closed)
                | (Open, Closed)
                // Reconnect after a mid-stream drop
                | (Open, Connecting)
        )
    }

    /// No further transitions are possible
    pub fn is_terminal(self) -> bool {
        matches!(self, FeedState::Closed | FeedState::Failed)
    }

    /// Packets are only processed while open
    pub fn accepts_packets(self) -> bool {
        matches!(self, FeedState::Open)
    }

    /// Get human-readable state name
    pub fn name(&self) -> &'static str {
        match self {
            FeedState::Idle => "Idle",
            FeedState::Connecting => "Connecting",
            FeedState::Open => "Open",
            FeedState::Closed => "Closed",
            FeedState::Failed => "Failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(FeedState::Idle.can_transition_to(FeedState::Connecting));
        assert!(FeedState::Connecting.can_transition_to(FeedState::Open));
        assert!(FeedState::Connecting.can_transition_to(FeedState::Failed));
        assert!(FeedState::Open.can_transition_to(FeedState::Closed));
    }

    #[test]
    fn test_open_never_fails() {
        assert!(!FeedState::Open.can_transition_to(FeedState::Failed));
    }

    #[test]
    fn test_terminal_states() {
        for terminal in [FeedState::Closed, FeedState::Failed] {
            assert!(terminal.is_terminal());
            for target in [
                FeedState::Idle,
                FeedState::Connecting,
                FeedState::Open,
                FeedState::Closed,
                FeedState::Failed,
            ] {
                assert!(!terminal.can_transition_to(target));
            }
        }
    }

    #[test]
    fn test_only_open_accepts_packets() {
        assert!(FeedState::Open.accepts_packets());
        assert!(!FeedState::Connecting.accepts_packets());
        assert!(!FeedState::Closed.accepts_packets());
        assert_eq!(FeedState::default(), FeedState::Idle);
    }
}
