//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only; the reducer never performs
//! I/O itself.
//!
//! ## Cancellation Effects
//!
//! Cancellation is initiated from the reducer via `UiEffect::CancelTask`.
//! The runtime executes these by calling `token.cancel()` on the provided
//! token.

use std::time::Duration;

use council_core::client::CouncilConfig;
use council_core::conversation::ExecutionMode;
use tokio_util::sync::CancellationToken;

use crate::common::{TaskId, TaskKind};
use crate::conversations::CreatePurpose;
use crate::rerun::{RerunRequest, RerunTarget};

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug)]
pub enum UiEffect {
    /// Fetch the conversation summaries.
    LoadConversationList { task: TaskId },

    /// Fetch one full conversation.
    LoadConversation { task: TaskId, id: String },

    /// Allocate a new conversation on the backend.
    CreateConversation { task: TaskId, purpose: CreatePurpose },

    /// Delete a conversation (already removed from the list).
    DeleteConversation { id: String },

    RenameConversation {
        task: TaskId,
        id: String,
        title: String,
    },

    UpdateCouncilConfig {
        task: TaskId,
        id: String,
        config: CouncilConfig,
    },

    LoadModels { task: TaskId },

    /// Open the pipeline stream for a prompt already appended optimistically.
    StartSession {
        task: TaskId,
        conversation_id: String,
        content: String,
        mode: ExecutionMode,
        cancel: CancellationToken,
    },

    /// Run one rerun-family request against the last assistant message.
    RunRerun {
        task: TaskId,
        target: RerunTarget,
        request: RerunRequest,
    },

    /// Wait `delay`, then deliver `RestartUiEvent::Settled`.
    SettleRestart {
        conversation_id: String,
        prompt: String,
        mode: ExecutionMode,
        delay: Duration,
    },

    // ========================================================================
    // Cancellation Effects
    // ========================================================================
    /// Cancel an in-progress task.
    CancelTask {
        kind: TaskKind,
        token: Option<CancellationToken>,
    },
}
