//! Error types for IPTV Core

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, Error>;

/// Library error types
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to decode configuration: {0}")]
    ConfigDecode(#[from] toml::de::Error),

    // Playback errors
    #[error("Invalid playback state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Streaming engine construction failed: {0}")]
    EngineInit(String),

    #[error("Player task is no longer running")]
    PlayerClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an engine construction error
    pub fn engine(msg: impl Into<String>) -> Self {
        Error::EngineInit(msg.into())
    }

    /// Returns the error code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::ConfigDecode(_) => "CONFIG_DECODE",
            Error::InvalidStateTransition { .. } => "INVALID_STATE",
            Error::EngineInit(_) => "ENGINE_INIT",
            Error::PlayerClosed => "PLAYER_CLOSED",
            Error::Io(_) => "IO",
        }
    }
}

/// Playback failures that end the current attempt and reach the user.
///
/// Each category renders as exactly one localized message, see
/// [`Messages::for_fault`](crate::config::Messages::for_fault).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalFault {
    /// Neither the adaptive engine nor native playback can handle the source
    Unsupported,
    /// The adaptive engine could not be constructed
    InitFailed,
    /// A playlist-shaped source failed variant parsing
    PlaylistFormat,
    /// A fatal engine fault outside the recoverable network/media classes
    Unrecoverable,
    /// Every autoplay attempt was rejected
    AutoplayBlocked,
}

impl TerminalFault {
    /// Returns the fault code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            TerminalFault::Unsupported => "PLAYBACK_UNSUPPORTED",
            TerminalFault::InitFailed => "PLAYER_INIT",
            TerminalFault::PlaylistFormat => "PLAYLIST_FORMAT",
            TerminalFault::Unrecoverable => "PLAYBACK_FAILED",
            TerminalFault::AutoplayBlocked => "AUTOPLAY_BLOCKED",
        }
    }
}

impl std::fmt::Display for TerminalFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.error_code())
    }
}
