//! Prompt-restart coordinator: edit the last prompt and replay it in a
//! fresh conversation.

mod state;
mod update;

pub use state::{RestartPhase, RestartState};
pub use update::{
    edit_and_restart, handle_restart_create_failed, handle_restart_created, handle_restart_event,
    reconcile,
};
