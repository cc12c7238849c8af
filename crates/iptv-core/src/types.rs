//! Core types for IPTV Core

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Duration value marking a live or unknown-length entry
pub const DURATION_UNKNOWN: i64 = -1;

/// One playable playlist entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Human-readable name
    pub title: String,
    /// Category label
    pub group: String,
    /// Icon URL, empty when absent
    pub logo: String,
    /// Length in seconds, [`DURATION_UNKNOWN`] for live streams
    pub duration: i64,
    /// Media locator
    pub url: String,
}

impl Channel {
    /// True when the entry carries no positive duration
    pub fn is_live(&self) -> bool {
        self.duration <= 0
    }

    pub fn has_logo(&self) -> bool {
        !self.logo.is_empty()
    }
}

/// Playback session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    /// No URL assigned
    Idle,
    /// Engine constructed, waiting for the manifest and a successful play
    Initializing,
    /// Media is playing
    Playing,
    /// Engine is recovering from a network or media fault
    Recovering,
    /// Terminal for the current URL until a new URL or a retry
    Failed,
}

impl PlayerState {
    /// Check if transition to target state is valid
    pub fn can_transition_to(&self, target: PlayerState) -> bool {
        use PlayerState::*;
        matches!(
            (self, target),
            // From Idle
            (Idle, Initializing) |
            // From Initializing
            (Initializing, Playing) | (Initializing, Recovering) | (Initializing, Failed) | (Initializing, Idle) |
            // From Playing
            (Playing, Recovering) | (Playing, Failed) | (Playing, Idle) |
            // From Recovering
            (Recovering, Playing) | (Recovering, Failed) | (Recovering, Idle) |
            // From Failed
            (Failed, Idle)
        )
    }

    /// True once no further automatic progress will happen for this URL
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlayerState::Failed)
    }
}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerState::Idle => write!(f, "idle"),
            PlayerState::Initializing => write!(f, "initializing"),
            PlayerState::Playing => write!(f, "playing"),
            PlayerState::Recovering => write!(f, "recovering"),
            PlayerState::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        assert!(PlayerState::Idle.can_transition_to(PlayerState::Initializing));
        assert!(PlayerState::Initializing.can_transition_to(PlayerState::Playing));
        assert!(PlayerState::Playing.can_transition_to(PlayerState::Recovering));
        assert!(PlayerState::Recovering.can_transition_to(PlayerState::Playing));
        assert!(PlayerState::Recovering.can_transition_to(PlayerState::Failed));
        assert!(PlayerState::Failed.can_transition_to(PlayerState::Idle));

        assert!(!PlayerState::Idle.can_transition_to(PlayerState::Playing));
        assert!(!PlayerState::Failed.can_transition_to(PlayerState::Playing));
        assert!(!PlayerState::Failed.can_transition_to(PlayerState::Initializing));
    }

    #[test]
    fn test_channel_live_flag() {
        let channel = Channel {
            title: "News".to_string(),
            group: "General".to_string(),
            logo: String::new(),
            duration: DURATION_UNKNOWN,
            url: "http://example.com/news.m3u8".to_string(),
        };
        assert!(channel.is_live());
        assert!(!channel.has_logo());
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&PlayerState::Recovering).unwrap();
        assert_eq!(json, "\"recovering\"");
    }
}
