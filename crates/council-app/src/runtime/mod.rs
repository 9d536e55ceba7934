//! Runtime - owns the client, executes effects, feeds results back.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//!
//! ## Inbox Pattern
//!
//! - Handlers send `UiEvent`s to `inbox_tx`
//! - The runtime drains `inbox_rx` and dispatches each event in order
//! - Spawned work is tracked in a `JoinSet`, so callers can wait until
//!   every outstanding operation has reported back
//!
//! Structure:
//! - `mod.rs`: Core runtime (Runtime, effect dispatch, idle loop)
//! - `inbox.rs`: Inbox channel types
//! - `handlers/`: Effect handler implementations

mod handlers;
mod inbox;

use std::future::Future;

use anyhow::Result;
use council_core::client::CouncilClient;
use council_core::config::Config;
use inbox::{UiEventReceiver, UiEventSender};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::effects::UiEffect;
use crate::events::{Command, UiEvent};
use crate::state::AppState;
use crate::update;

/// Council application runtime.
///
/// Owns the state and the backend client. Commands go in through
/// `command`/`dispatch`; `run_until_idle` drives spawned work to completion.
pub struct Runtime {
    /// Application state.
    pub state: AppState,
    client: CouncilClient,
    /// Inbox sender - handlers send events here.
    inbox_tx: UiEventSender,
    /// Inbox receiver - drained by the runtime.
    inbox_rx: UiEventReceiver,
    /// Spawned effect tasks.
    tasks: JoinSet<()>,
}

impl Runtime {
    /// Creates a runtime talking to the backend named in `config`.
    ///
    /// # Errors
    /// Returns an error if the backend client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let client = CouncilClient::new(config)?;
        Ok(Self::with_client(client, AppState::new(config)))
    }

    pub fn with_client(client: CouncilClient, state: AppState) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            state,
            client,
            inbox_tx,
            inbox_rx,
            tasks: JoinSet::new(),
        }
    }

    /// Issues a view command.
    pub fn command(&mut self, command: Command) {
        self.dispatch(UiEvent::Command(command));
    }

    /// Runs `event` through the reducer and executes the resulting effects.
    pub fn dispatch(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        self.execute_effects(effects);
    }

    /// Processes results until no spawned work is outstanding.
    pub async fn run_until_idle(&mut self) {
        loop {
            while let Ok(event) = self.inbox_rx.try_recv() {
                self.dispatch(event);
            }
            if self.tasks.is_empty() {
                break;
            }

            let next = tokio::select! {
                event = self.inbox_rx.recv() => event,
                Some(joined) = self.tasks.join_next() => {
                    if let Err(err) = joined {
                        tracing::error!(error = %err, "effect task failed");
                    }
                    None
                }
            };
            if let Some(event) = next {
                self.dispatch(event);
            }
        }
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns a pure async handler and sends its result to the inbox.
    fn spawn_effect<F, Fut>(&mut self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        self.tasks.spawn(async move {
            let _ = tx.send(f().await);
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        let client = self.client.clone();
        match effect {
            UiEffect::LoadConversationList { task } => {
                self.spawn_effect(move || handlers::conversation_list_load(client, task));
            }
            UiEffect::LoadConversation { task, id } => {
                self.spawn_effect(move || handlers::conversation_load(client, task, id));
            }
            UiEffect::CreateConversation { task, purpose } => {
                self.spawn_effect(move || handlers::conversation_create(client, task, purpose));
            }
            UiEffect::DeleteConversation { id } => {
                self.spawn_effect(move || handlers::conversation_delete(client, id));
            }
            UiEffect::RenameConversation { task, id, title } => {
                self.spawn_effect(move || handlers::conversation_rename(client, task, id, title));
            }
            UiEffect::UpdateCouncilConfig { task, id, config } => {
                self.spawn_effect(move || handlers::council_config_update(client, task, id, config));
            }
            UiEffect::LoadModels { task } => {
                self.spawn_effect(move || handlers::models_load(client, task));
            }

            // Streaming: the handler sends every event itself.
            UiEffect::StartSession {
                task,
                conversation_id,
                content,
                mode,
                cancel,
            } => {
                let tx = self.inbox_tx.clone();
                self.tasks.spawn(handlers::run_session(
                    client,
                    tx,
                    task,
                    conversation_id,
                    content,
                    mode,
                    cancel,
                ));
            }

            UiEffect::RunRerun {
                task,
                target,
                request,
            } => {
                self.spawn_effect(move || handlers::run_rerun(client, task, target, request));
            }
            UiEffect::SettleRestart {
                conversation_id,
                prompt,
                mode,
                delay,
            } => {
                self.spawn_effect(move || {
                    handlers::restart_settle(conversation_id, prompt, mode, delay)
                });
            }

            // ================================================================
            // Cancellation Effects
            // ================================================================
            UiEffect::CancelTask { kind, token } => {
                tracing::debug!(?kind, "cancelling task");
                if let Some(cancel) = token {
                    cancel.cancel();
                }
            }
        }
    }
}
