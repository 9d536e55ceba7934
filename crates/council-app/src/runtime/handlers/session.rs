use council_core::client::CouncilClient;
use council_core::conversation::ExecutionMode;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::common::TaskId;
use crate::events::{SessionUiEvent, UiEvent};
use crate::runtime::inbox::UiEventSender;

/// Streams one pipeline session into the inbox.
///
/// Every decoded event is forwarded in order. The stream ends at the first
/// terminal event; anything else that ends it is reported as `Aborted`.
/// Cancellation stops forwarding without a final event.
pub async fn run_session(
    client: CouncilClient,
    tx: UiEventSender,
    task: TaskId,
    conversation_id: String,
    content: String,
    mode: ExecutionMode,
    cancel: CancellationToken,
) {
    let opened = tokio::select! {
        () = cancel.cancelled() => return,
        opened = client.send_message_stream(&conversation_id, &content, mode) => opened,
    };
    let mut events = match opened {
        Ok(events) => events,
        Err(e) => {
            let _ = tx.send(UiEvent::Session(SessionUiEvent::OpenFailed {
                task,
                conversation_id,
                error: format!("{e:#}"),
            }));
            return;
        }
    };

    loop {
        let next = tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!(conversation = %conversation_id, "session cancelled");
                return;
            }
            next = events.next() => next,
        };
        let error = match next {
            Some(Ok(event)) => {
                let terminal = event.is_terminal();
                let _ = tx.send(UiEvent::Session(SessionUiEvent::Event {
                    task,
                    conversation_id: conversation_id.clone(),
                    event,
                }));
                if terminal {
                    return;
                }
                continue;
            }
            Some(Err(e)) => e.to_string(),
            None => "stream closed before completion".to_string(),
        };
        tracing::warn!(conversation = %conversation_id, %error, "pipeline stream aborted");
        let _ = tx.send(UiEvent::Session(SessionUiEvent::Aborted {
            task,
            conversation_id,
            error,
        }));
        return;
    }
}
