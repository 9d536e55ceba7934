//! UI event types.
//!
//! Everything the reducer reacts to is a `UiEvent`: commands issued by the
//! view and results of async work delivered through the runtime inbox.
//!
//! ## Task Results
//!
//! Results of async work carry the `TaskId` they were started with. The
//! reducer drops a result whose task is no longer active (superseded or
//! cancelled), so late results never overwrite newer state.
//!
//! ## Session Routing
//!
//! Streamed pipeline events carry the id of the conversation they belong
//! to; they only touch the active conversation when the ids match.

use council_core::client::{CouncilConfig, ModelCatalog};
use council_core::conversation::{Conversation, ConversationSummary, ExecutionMode};
use council_core::events::CouncilEvent;

use crate::common::TaskId;
use crate::conversations::CreatePurpose;
use crate::rerun::{RerunOutcome, RerunTarget};

/// Inbound command surface used by the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RefreshConversations,
    CreateConversation,
    SelectConversation {
        id: String,
    },
    /// Reload the selected conversation.
    RefreshConversation,
    DeleteConversation {
        id: String,
    },
    RenameConversation {
        id: String,
        title: String,
    },
    UpdateCouncilConfig {
        council_models: Option<Vec<String>>,
        chairman_model: Option<String>,
    },
    LoadModels,
    SendMessage {
        text: String,
    },
    EditLastPromptAndRestart {
        text: String,
    },
    RerunStage1Model {
        model: String,
    },
    RerunStage2Model {
        model: String,
    },
    RerunStage3,
    ContinueNextStage,
    SetExecutionMode {
        mode: ExecutionMode,
    },
}

/// Conversation list and conversation I/O results.
#[derive(Debug)]
pub enum ConversationUiEvent {
    ListLoaded {
        task: TaskId,
        conversations: Vec<ConversationSummary>,
    },
    ListFailed {
        task: TaskId,
        error: String,
    },
    Loaded {
        task: TaskId,
        conversation: Conversation,
    },
    LoadFailed {
        task: TaskId,
        id: String,
        error: String,
    },
    Created {
        task: TaskId,
        purpose: CreatePurpose,
        conversation: Conversation,
    },
    CreateFailed {
        task: TaskId,
        purpose: CreatePurpose,
        error: String,
    },
    Deleted {
        id: String,
    },
    DeleteFailed {
        id: String,
        error: String,
    },
    Renamed {
        task: TaskId,
        id: String,
        title: String,
    },
    RenameFailed {
        task: TaskId,
        id: String,
        error: String,
    },
    ConfigUpdated {
        task: TaskId,
        id: String,
        config: CouncilConfig,
    },
    ConfigFailed {
        task: TaskId,
        id: String,
        error: String,
    },
}

/// Streamed pipeline session results.
#[derive(Debug)]
pub enum SessionUiEvent {
    /// One decoded pipeline event, in delivery order.
    Event {
        task: TaskId,
        conversation_id: String,
        event: CouncilEvent,
    },
    /// The stream could not be opened.
    OpenFailed {
        task: TaskId,
        conversation_id: String,
        error: String,
    },
    /// The stream broke off (transport error, undecodable frame, idle
    /// timeout, or close without a terminal event).
    Aborted {
        task: TaskId,
        conversation_id: String,
        error: String,
    },
}

#[derive(Debug)]
pub enum RerunUiEvent {
    Finished {
        task: TaskId,
        target: RerunTarget,
        outcome: RerunOutcome,
    },
    Failed {
        task: TaskId,
        target: RerunTarget,
        error: String,
    },
}

#[derive(Debug)]
pub enum RestartUiEvent {
    /// The settle delay after provisioning the replacement has elapsed.
    Settled {
        conversation_id: String,
        prompt: String,
        mode: ExecutionMode,
    },
}

#[derive(Debug)]
pub enum ModelsUiEvent {
    Loaded { task: TaskId, catalog: ModelCatalog },
    Failed { task: TaskId, error: String },
}

/// Unified event enum for the app.
#[derive(Debug)]
pub enum UiEvent {
    Command(Command),
    Conversation(ConversationUiEvent),
    Session(SessionUiEvent),
    Rerun(RerunUiEvent),
    Restart(RestartUiEvent),
    Models(ModelsUiEvent),
}

impl From<Command> for UiEvent {
    fn from(command: Command) -> Self {
        UiEvent::Command(command)
    }
}
