//! Playback Session Manager - drives one adaptive engine per target URL
//!
//! Coordinates:
//! - Engine construction, with native playback as fallback
//! - Fault classification and transparent recovery
//! - Autoplay with bounded, delayed retries
//! - Teardown of the engine and every pending task on URL change or unmount
//!
//! The manager is a synchronous state machine fed from a single input queue.
//! Engine events, play outcomes and retry timers all arrive through that
//! queue tagged with the engine generation that produced them; anything from
//! a torn-down generation is dropped.

use crate::{
    config::PlayerConfig,
    engine::{
        EngineBackend, EngineEvent, EngineFault, EventSink, FaultKind, MediaElement, PlayRejected,
        StreamEngine,
    },
    error::TerminalFault,
    source::is_playlist_url,
    types::{PlayerState, SessionId},
    Error, Result,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace, warn};

/// Input queued for the session manager
#[derive(Debug)]
pub struct SessionInput {
    generation: u64,
    kind: InputKind,
}

#[derive(Debug)]
enum InputKind {
    Engine(EngineEvent),
    PlayOutcome {
        chain: u64,
        result: std::result::Result<(), PlayRejected>,
    },
    RetryDue {
        chain: u64,
    },
}

impl SessionInput {
    pub(crate) fn engine(generation: u64, event: EngineEvent) -> Self {
        Self {
            generation,
            kind: InputKind::Engine(event),
        }
    }
}

/// Receiving end of a manager's input queue
#[derive(Debug)]
pub struct SessionInputs {
    rx: mpsc::UnboundedReceiver<SessionInput>,
}

impl SessionInputs {
    /// Wait for the next input
    pub async fn next(&mut self) -> Option<SessionInput> {
        self.rx.recv().await
    }
}

enum EngineHandle {
    Adaptive(Box<dyn StreamEngine>),
    Native,
}

/// Live state of one playback attempt
pub struct PlaybackSession {
    id: SessionId,
    target_url: String,
    is_playlist_source: bool,
    play_attempts: u32,
    has_played: bool,
    generation: u64,
    autoplay_chain: u64,
    engine: Option<EngineHandle>,
    /// Cancelled when the current engine generation is torn down
    cancel: CancellationToken,
    /// Child of `cancel`, replaced for every autoplay sequence
    autoplay_cancel: CancellationToken,
}

impl PlaybackSession {
    fn new(target_url: String) -> Self {
        let cancel = CancellationToken::new();
        let autoplay_cancel = cancel.child_token();
        Self {
            id: SessionId::new(),
            is_playlist_source: is_playlist_url(&target_url),
            target_url,
            play_attempts: 0,
            has_played: false,
            generation: 0,
            autoplay_chain: 0,
            engine: None,
            cancel,
            autoplay_cancel,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    /// The URL looks like an M3U playlist; selects the slower retry backoff
    pub fn is_playlist_source(&self) -> bool {
        self.is_playlist_source
    }

    /// Rejected play attempts in the current autoplay sequence
    pub fn play_attempts(&self) -> u32 {
        self.play_attempts
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    fn begin_generation(&mut self, generation: u64) {
        self.generation = generation;
        self.cancel = CancellationToken::new();
        self.autoplay_cancel = self.cancel.child_token();
        self.play_attempts = 0;
        self.has_played = false;
    }

    fn adaptive_engine(&mut self) -> Option<&mut Box<dyn StreamEngine>> {
        match self.engine.as_mut() {
            Some(EngineHandle::Adaptive(engine)) => Some(engine),
            _ => None,
        }
    }

    /// Cancel pending tasks, then destroy the engine
    fn release(&mut self, media: &dyn MediaElement) {
        self.cancel.cancel();
        match self.engine.take() {
            Some(EngineHandle::Adaptive(mut engine)) => {
                engine.destroy();
                debug!(session_id = %self.id, generation = self.generation, "Engine destroyed");
            }
            Some(EngineHandle::Native) => {
                media.clear_source();
                debug!(session_id = %self.id, "Native source cleared");
            }
            None => {}
        }
    }
}

/// Session manager owning at most one live engine
pub struct SessionManager {
    backend: Arc<dyn EngineBackend>,
    media: Arc<dyn MediaElement>,
    config: PlayerConfig,
    state: PlayerState,
    session: Option<PlaybackSession>,
    last_error: Option<String>,
    next_generation: u64,
    inputs_tx: mpsc::UnboundedSender<SessionInput>,
    state_tx: watch::Sender<PlayerState>,
    error_tx: watch::Sender<Option<String>>,
}

impl SessionManager {
    /// Create a manager and the queue it must be fed from
    pub fn new(
        backend: Arc<dyn EngineBackend>,
        media: Arc<dyn MediaElement>,
        config: PlayerConfig,
    ) -> (Self, SessionInputs) {
        let (inputs_tx, rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(PlayerState::Idle);
        let (error_tx, _) = watch::channel(None);

        let manager = Self {
            backend,
            media,
            config,
            state: PlayerState::Idle,
            session: None,
            last_error: None,
            next_generation: 0,
            inputs_tx,
            state_tx,
            error_tx,
        };
        (manager, SessionInputs { rx })
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Last user-facing error message
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Subscribe to state changes
    pub fn subscribe_state(&self) -> watch::Receiver<PlayerState> {
        self.state_tx.subscribe()
    }

    /// Subscribe to the error slot
    pub fn subscribe_errors(&self) -> watch::Receiver<Option<String>> {
        self.error_tx.subscribe()
    }

    /// Point the player at a new URL, or at nothing.
    ///
    /// The previous engine is destroyed before anything touches the next one.
    #[instrument(skip(self))]
    pub fn set_url(&mut self, url: Option<String>) {
        if self.session.as_ref().map(|s| s.target_url.as_str()) == url.as_deref() {
            debug!("Target URL unchanged");
            return;
        }

        self.teardown();
        self.session = None;
        self.clear_error();

        if let Some(url) = url {
            let session = PlaybackSession::new(url);
            info!(
                session_id = %session.id,
                url = %session.target_url,
                playlist = session.is_playlist_source,
                "Session created"
            );
            self.session = Some(session);
            self.initialize();
        }
    }

    /// Clear the error and initialize again against the same URL
    #[instrument(skip(self))]
    pub fn retry(&mut self) {
        self.clear_error();
        if self.session.is_none() {
            debug!("Retry without a target URL ignored");
            return;
        }
        info!("Retrying playback");
        self.teardown();
        self.initialize();
    }

    /// Release everything; the manager returns to idle
    #[instrument(skip(self))]
    pub fn unmount(&mut self) {
        self.teardown();
        if let Some(session) = self.session.take() {
            info!(session_id = %session.id, "Session closed");
        }
    }

    /// Process one queued input
    pub fn handle(&mut self, input: SessionInput) {
        let current = self.session.as_ref().map(|s| s.generation);
        if current != Some(input.generation) {
            trace!(generation = input.generation, ?current, "Stale input dropped");
            return;
        }

        match input.kind {
            InputKind::Engine(event) => self.on_engine_event(event),
            InputKind::PlayOutcome { chain, result } => self.on_play_outcome(chain, result),
            InputKind::RetryDue { chain } => self.on_retry_due(chain),
        }
    }

    fn initialize(&mut self) {
        self.next_generation += 1;
        let generation = self.next_generation;
        let url = match self.session.as_mut() {
            Some(session) => {
                session.begin_generation(generation);
                session.target_url.clone()
            }
            None => return,
        };
        let sink = EventSink::new(generation, self.inputs_tx.clone());

        self.transition(PlayerState::Initializing);

        if self.backend.is_supported() {
            match self.backend.create(&self.config.engine, sink) {
                Ok(mut engine) => {
                    engine.load_source(&url);
                    engine.attach_media();
                    if let Some(session) = self.session.as_mut() {
                        session.engine = Some(EngineHandle::Adaptive(engine));
                    }
                    info!(url = %url, generation, "Adaptive engine initialized");
                }
                Err(e) => {
                    error!(error = %e, code = e.error_code(), "Engine construction failed");
                    self.fail(TerminalFault::InitFailed);
                }
            }
        } else if self.media.can_play_native() {
            self.media.set_source(&url, sink);
            if let Some(session) = self.session.as_mut() {
                session.engine = Some(EngineHandle::Native);
            }
            info!(url = %url, generation, "Adaptive engine unsupported, using native playback");
        } else {
            self.fail(TerminalFault::Unsupported);
        }
    }

    fn teardown(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.release(self.media.as_ref());
        }
        self.transition(PlayerState::Idle);
    }

    fn on_engine_event(&mut self, event: EngineEvent) {
        if self.state.is_terminal() {
            debug!(?event, "Event ignored after terminal failure");
            return;
        }

        match event {
            EngineEvent::Error(fault) => self.on_fault(fault),
            EngineEvent::ManifestParsed => {
                info!("Manifest parsed");
                self.start_autoplay();
            }
            EngineEvent::MetadataLoaded => {
                info!("Media metadata loaded");
                self.start_autoplay();
            }
            EngineEvent::Recovered => {
                let has_played = self.session.as_ref().map(|s| s.has_played).unwrap_or(false);
                if self.state == PlayerState::Recovering && has_played {
                    info!("Engine recovered");
                    self.transition(PlayerState::Playing);
                }
            }
        }
    }

    fn on_fault(&mut self, fault: EngineFault) {
        let playlist_source = self
            .session
            .as_ref()
            .map(|s| s.is_playlist_source)
            .unwrap_or(false);

        if playlist_source && fault.is_level_parsing() {
            warn!(fault = %fault, "Playlist source failed level parsing");
            self.fail(TerminalFault::PlaylistFormat);
            return;
        }

        if !fault.fatal {
            warn!(fault = %fault, "Non-fatal engine fault");
            return;
        }

        let recovering = match self.session.as_mut().and_then(PlaybackSession::adaptive_engine) {
            Some(engine) => match fault.kind {
                FaultKind::Network => {
                    warn!(fault = %fault, "Network fault, resuming load");
                    engine.start_load();
                    true
                }
                FaultKind::Media => {
                    warn!(fault = %fault, "Media fault, recovering media pipeline");
                    engine.recover_media_error();
                    true
                }
                FaultKind::Other => false,
            },
            None => false,
        };

        if recovering {
            self.transition(PlayerState::Recovering);
        } else {
            error!(fault = %fault, "Unrecoverable engine fault");
            self.fail(TerminalFault::Unrecoverable);
        }
    }

    fn start_autoplay(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.play_attempts = 0;
        session.autoplay_cancel.cancel();
        session.autoplay_cancel = session.cancel.child_token();
        session.autoplay_chain += 1;
        self.attempt_play();
    }

    fn attempt_play(&self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let media = Arc::clone(&self.media);
        let tx = self.inputs_tx.clone();
        let token = session.autoplay_cancel.clone();
        let (generation, chain) = (session.generation, session.autoplay_chain);

        debug!(attempt = session.play_attempts + 1, "Attempting playback");

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                result = media.play() => {
                    let _ = tx.send(SessionInput {
                        generation,
                        kind: InputKind::PlayOutcome { chain, result },
                    });
                }
            }
        });
    }

    fn schedule_retry(&self, delay: Duration) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let tx = self.inputs_tx.clone();
        let token = session.autoplay_cancel.clone();
        let (generation, chain) = (session.generation, session.autoplay_chain);

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = tx.send(SessionInput {
                        generation,
                        kind: InputKind::RetryDue { chain },
                    });
                }
            }
        });
    }

    fn on_play_outcome(&mut self, chain: u64, result: std::result::Result<(), PlayRejected>) {
        if self.state.is_terminal() {
            return;
        }
        let policy = self.config.retry.clone();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if chain != session.autoplay_chain {
            trace!(chain, "Outcome from superseded autoplay dropped");
            return;
        }

        match result {
            Ok(()) => {
                session.play_attempts = 0;
                session.has_played = true;
                info!(session_id = %session.id, "Playback started");
                self.transition(PlayerState::Playing);
            }
            Err(rejection) => {
                session.play_attempts += 1;
                let attempts = session.play_attempts;

                if policy.allows_retry(attempts) {
                    let delay = policy.delay_for(attempts, session.is_playlist_source);
                    warn!(
                        attempt = attempts,
                        max_attempts = policy.max_play_attempts,
                        delay_ms = delay.as_millis() as u64,
                        reason = %rejection,
                        "Play rejected, retry scheduled"
                    );
                    self.schedule_retry(delay);
                } else {
                    warn!(attempts, reason = %rejection, "Autoplay attempts exhausted");
                    self.fail(TerminalFault::AutoplayBlocked);
                }
            }
        }
    }

    fn on_retry_due(&mut self, chain: u64) {
        if self.state.is_terminal() {
            return;
        }
        match self.session.as_ref() {
            Some(session) if session.autoplay_chain == chain => self.attempt_play(),
            _ => trace!(chain, "Retry from superseded autoplay dropped"),
        }
    }

    fn fail(&mut self, fault: TerminalFault) {
        if let Some(session) = self.session.as_ref() {
            session.autoplay_cancel.cancel();
        }
        let message = self.config.messages.for_fault(fault).to_string();
        error!(code = fault.error_code(), message = %message, "Playback failed");

        self.transition(PlayerState::Failed);
        self.last_error = Some(message.clone());
        self.error_tx.send_replace(Some(message));
    }

    fn clear_error(&mut self) {
        if self.last_error.take().is_some() {
            self.error_tx.send_replace(None);
        }
    }

    /// Transition to new state
    fn set_state(&mut self, next: PlayerState) -> Result<()> {
        let current = self.state;
        if current == next {
            return Ok(());
        }
        if !current.can_transition_to(next) {
            return Err(Error::InvalidStateTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        self.state = next;
        self.state_tx.send_replace(next);
        info!(from = %current, to = %next, "State transition");
        Ok(())
    }

    fn transition(&mut self, next: PlayerState) {
        if let Err(e) = self.set_state(next) {
            warn!(error = %e, "State transition rejected");
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.release(self.media.as_ref());
        }
    }
}
