//! Playback facade
//!
//! Runs a [`SessionManager`] on its own task and exposes the small surface
//! the UI needs: the current error, the state, and the retry action.

use crate::{
    config::PlayerConfig,
    engine::{EngineBackend, MediaElement},
    session::{SessionInputs, SessionManager},
    types::PlayerState,
    Error, Result,
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug)]
enum Command {
    SetUrl(Option<String>),
    Retry,
    Shutdown(oneshot::Sender<()>),
}

/// Handle to a running player
pub struct Player {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<PlayerState>,
    errors: watch::Receiver<Option<String>>,
    task: JoinHandle<()>,
}

impl Player {
    /// Start the session manager task
    pub fn spawn(
        backend: Arc<dyn EngineBackend>,
        media: Arc<dyn MediaElement>,
        config: PlayerConfig,
    ) -> Self {
        let (manager, inputs) = SessionManager::new(backend, media, config);
        let state = manager.subscribe_state();
        let errors = manager.subscribe_errors();
        let (commands, rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run(manager, inputs, rx));
        info!("Player started");

        Self {
            commands,
            state,
            errors,
            task,
        }
    }

    /// Select the URL to play; `None` stops playback
    pub fn set_url(&self, url: Option<String>) -> Result<()> {
        self.send(Command::SetUrl(url))
    }

    /// Clear the error and initialize again against the current URL
    pub fn retry(&self) -> Result<()> {
        self.send(Command::Retry)
    }

    /// Current user-facing error, if any
    pub fn last_error(&self) -> Option<String> {
        self.errors.borrow().clone()
    }

    pub fn state(&self) -> PlayerState {
        *self.state.borrow()
    }

    /// Subscribe to error slot changes
    pub fn subscribe_errors(&self) -> watch::Receiver<Option<String>> {
        self.errors.clone()
    }

    /// Subscribe to state changes
    pub fn subscribe_state(&self) -> watch::Receiver<PlayerState> {
        self.state.clone()
    }

    /// Release the engine and stop the task
    pub async fn shutdown(self) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.send(Command::Shutdown(done_tx))?;
        done_rx.await.map_err(|_| Error::PlayerClosed)?;
        self.task.await.map_err(|_| Error::PlayerClosed)?;
        Ok(())
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).map_err(|_| Error::PlayerClosed)
    }
}

async fn run(
    mut manager: SessionManager,
    mut inputs: SessionInputs,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let mut done = None;

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::SetUrl(url)) => manager.set_url(url),
                Some(Command::Retry) => manager.retry(),
                Some(Command::Shutdown(tx)) => {
                    done = Some(tx);
                    break;
                }
                None => {
                    debug!("Player handle dropped");
                    break;
                }
            },
            Some(input) = inputs.next() => manager.handle(input),
        }
    }

    manager.unmount();
    info!("Player stopped");
    if let Some(tx) = done {
        let _ = tx.send(());
    }
}
