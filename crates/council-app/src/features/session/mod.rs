//! Pipeline session controller: one streamed send at a time.

mod state;
mod update;

pub use state::SessionState;
pub use update::{handle_session_event, send_message, start_send};
