//! Rerun/continue coordinator for the last assistant message.

mod state;
mod update;

pub use state::{RerunOutcome, RerunRequest, RerunState, RerunTarget};
pub use update::{continue_next_stage, handle_rerun_event, rerun};
