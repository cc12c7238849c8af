//! IPTV Core - playlist and playback library for the IPTV player
//!
//! This crate provides the logic behind the player page:
//! - M3U playlist parsing into typed channels
//! - Channel search
//! - Source resolution (playlist vs. single stream) and proxy routing
//! - A playback session manager driving an adaptive streaming engine
//! - A facade exposing the error slot and the retry action to the UI
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          IPTV Core                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐                             │
//! │  │   Playlist   │─▶│    Source    │── playback URL ──┐          │
//! │  │    Parser    │  │   Resolver   │                  │          │
//! │  └──────────────┘  └──────────────┘                  ▼          │
//! │                                              ┌──────────────┐   │
//! │  ┌──────────────┐   engine events            │    Player    │   │
//! │  │    Engine    │───────────────────────────▶│    Facade    │   │
//! │  │   Backend    │◀─── load / recover ────────│   (Session   │   │
//! │  └──────────────┘         / destroy          │   Manager)   │   │
//! │                                              └──────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod player;
pub mod playlist;
pub mod session;
pub mod source;
pub mod types;

pub use config::{EngineConfig, Messages, PlayerConfig, RetryPolicy};
pub use engine::{
    EngineBackend, EngineEvent, EngineFault, EventSink, FaultKind, MediaElement, PlayRejected,
    StreamEngine, LEVEL_PARSING_ERROR,
};
pub use error::{Error, Result, TerminalFault};
pub use player::Player;
pub use playlist::{parse, search, PlaylistParser};
pub use session::{PlaybackSession, SessionInput, SessionInputs, SessionManager};
pub use source::{is_playlist_response, is_playlist_url, resolve_source, ProxyEndpoint, ResolvedSource};
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "IPTV Core initialized");
}
