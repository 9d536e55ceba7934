//! Effect handlers for the runtime.
//!
//! These functions perform I/O against the backend. They do NOT mutate state
//! directly.
//!
//! ## Pure Async Pattern
//!
//! Handlers are pure async functions that return `UiEvent`. The runtime uses
//! `spawn_effect` to spawn them and send results to the inbox. The streaming
//! session is the exception: it owns an inbox sender and reports each event
//! as it arrives.
//!
//! ```ignore
//! // Handler: pure async, returns UiEvent
//! pub async fn conversation_load(client: CouncilClient, task: TaskId, id: String) -> UiEvent { ... }
//!
//! // Runtime: spawns and sends to inbox
//! self.spawn_effect(move || handlers::conversation_load(client, task, id));
//! ```

pub mod conversation;
pub mod rerun;
pub mod restart;
pub mod session;

pub use conversation::*;
pub use rerun::*;
pub use restart::*;
pub use session::*;
