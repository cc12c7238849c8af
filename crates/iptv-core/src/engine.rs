//! Adaptive streaming engine abstraction
//!
//! The session manager never talks to a concrete engine. A backend reports
//! whether adaptive playback is available and builds engine instances; the
//! media element covers native playback and the play action. Both report
//! lifecycle signals through an [`EventSink`].

use crate::{config::EngineConfig, session::SessionInput, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Detail reported when a variant playlist cannot be parsed
pub const LEVEL_PARSING_ERROR: &str = "levelParsingError";

/// Fault class assigned by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    Network,
    Media,
    Other,
}

/// Error reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFault {
    /// The engine cannot continue without intervention
    pub fatal: bool,
    pub kind: FaultKind,
    /// Engine-specific detail code
    pub detail: String,
}

impl EngineFault {
    pub fn new(kind: FaultKind, fatal: bool, detail: impl Into<String>) -> Self {
        Self {
            fatal,
            kind,
            detail: detail.into(),
        }
    }

    /// Variant/level playlist parsing failed
    pub fn is_level_parsing(&self) -> bool {
        self.detail == LEVEL_PARSING_ERROR
    }
}

impl std::fmt::Display for EngineFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} fault ({}): {}",
            self.kind,
            if self.fatal { "fatal" } else { "non-fatal" },
            self.detail
        )
    }
}

/// Lifecycle signals consumed by the session manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine error
    Error(EngineFault),
    /// The adaptive engine parsed the manifest
    ManifestParsed,
    /// Native playback loaded the media metadata
    MetadataLoaded,
    /// Media flows again after a recovery primitive
    Recovered,
}

/// Delivers events for one engine generation to its session manager.
///
/// Events emitted after the generation was torn down are discarded by the
/// manager.
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: u64,
    tx: mpsc::UnboundedSender<SessionInput>,
}

impl EventSink {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<SessionInput>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Queue an event; returns false once the manager is gone
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.tx
            .send(SessionInput::engine(self.generation, event))
            .is_ok()
    }
}

/// A live adaptive streaming engine instance
pub trait StreamEngine: Send {
    fn load_source(&mut self, url: &str);

    fn attach_media(&mut self);

    /// Resume loading after a network fault
    fn start_load(&mut self);

    /// Reset the media pipeline after a decode fault
    fn recover_media_error(&mut self);

    /// Release the instance; no other call follows
    fn destroy(&mut self);
}

/// Capability object that builds adaptive engines
pub trait EngineBackend: Send + Sync {
    /// Adaptive playback is available on this platform
    fn is_supported(&self) -> bool;

    /// Build an engine that reports through `events`
    fn create(&self, config: &EngineConfig, events: EventSink) -> Result<Box<dyn StreamEngine>>;
}

/// Rejection of a play request, e.g. by an autoplay policy
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("play rejected: {0}")]
pub struct PlayRejected(pub String);

/// The video surface the engine renders into
#[async_trait]
pub trait MediaElement: Send + Sync {
    /// The platform plays the adaptive format without an engine
    fn can_play_native(&self) -> bool;

    /// Assign the URL for native playback; `MetadataLoaded` follows on `events`
    fn set_source(&self, url: &str, events: EventSink);

    /// Drop the natively assigned source
    fn clear_source(&self);

    /// Start playback
    async fn play(&self) -> std::result::Result<(), PlayRejected>;
}
