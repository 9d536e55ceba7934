//! Application state composition.
//!
//! ```text
//! AppState
//! ├── conversations: ConversationsState (list, selection, active, pending deletes)
//! ├── session: SessionState   (in-flight send routing + rollback point)
//! ├── rerun: RerunState       (rerun/continue busy indicators)
//! ├── restart: RestartState   (edit-and-restart phase)
//! ├── execution_mode, models, status
//! ├── task_seq: TaskSeq       (async task id generator)
//! └── tasks: Tasks            (task lifecycle state)
//! ```

use std::time::Duration;

use council_core::client::ModelCatalog;
use council_core::config::Config;
use council_core::conversation::{Conversation, ExecutionMode};

use crate::common::{TaskSeq, Tasks};
use crate::conversations::ConversationsState;
use crate::rerun::RerunState;
use crate::restart::RestartState;
use crate::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

/// Outcome of the last operation that had something to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub level: StatusLevel,
    pub message: String,
}

impl Status {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == StatusLevel::Error
    }
}

/// Per-operation busy indicators exposed to the view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusyIndicators {
    pub send_busy: bool,
    pub rerun_stage1_model: Option<String>,
    pub rerun_stage2_model: Option<String>,
    pub rerun_stage3_busy: bool,
    pub restart_busy: bool,
    pub continue_busy: bool,
}

#[derive(Debug)]
pub struct AppState {
    pub conversations: ConversationsState,
    pub session: SessionState,
    pub rerun: RerunState,
    pub restart: RestartState,
    pub execution_mode: ExecutionMode,
    pub models: Option<ModelCatalog>,
    pub status: Option<Status>,
    /// Delay between provisioning a restart conversation and replaying.
    pub restart_settle: Duration,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            conversations: ConversationsState::default(),
            session: SessionState::default(),
            rerun: RerunState::default(),
            restart: RestartState::default(),
            execution_mode: config.default_mode,
            models: None,
            status: None,
            restart_settle: config.restart_settle(),
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
        }
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.conversations.active.as_ref()
    }

    pub fn send_busy(&self) -> bool {
        self.tasks.session.is_running()
    }

    pub fn busy(&self) -> BusyIndicators {
        BusyIndicators {
            send_busy: self.send_busy(),
            rerun_stage1_model: self.rerun.stage1_model.clone(),
            rerun_stage2_model: self.rerun.stage2_model.clone(),
            rerun_stage3_busy: self.rerun.stage3_busy,
            restart_busy: self.restart.is_busy(),
            continue_busy: self.rerun.continue_busy,
        }
    }

    pub fn set_info(&mut self, message: impl Into<String>) {
        self.status = Some(Status::info(message));
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        let status = Status::error(message);
        tracing::warn!(message = %status.message, "operation failed");
        self.status = Some(status);
    }

    /// Records a rejected command (busy, precondition or validation).
    pub fn reject(&mut self, message: impl Into<String>) {
        let status = Status::error(message);
        tracing::debug!(message = %status.message, "command rejected");
        self.status = Some(status);
    }

    pub fn take_status(&mut self) -> Option<Status> {
        self.status.take()
    }
}
