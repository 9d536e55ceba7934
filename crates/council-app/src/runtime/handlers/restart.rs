use std::time::Duration;

use council_core::conversation::ExecutionMode;

use crate::events::{RestartUiEvent, UiEvent};

/// Waits out the settle delay of a freshly provisioned restart conversation.
pub async fn restart_settle(
    conversation_id: String,
    prompt: String,
    mode: ExecutionMode,
    delay: Duration,
) -> UiEvent {
    tokio::time::sleep(delay).await;
    UiEvent::Restart(RestartUiEvent::Settled {
        conversation_id,
        prompt,
        mode,
    })
}
