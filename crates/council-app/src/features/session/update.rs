//! Pipeline session reducer.
//!
//! `send` appends the user prompt and an empty assistant message before any
//! network activity, then folds streamed events into that assistant message.
//! How the session ends decides what happens to the optimistic pair:
//! - the initiating request failed: both messages are removed again
//! - `error` event, idle timeout or a broken stream once it opened: partial
//!   stages stay, spinners stop
//! - `paused` / `complete`: the session simply ends

use council_core::conversation::{Conversation, ExecutionMode};
use council_core::reducer::{StreamSignal, apply_event, signal_of};
use tokio_util::sync::CancellationToken;

use crate::conversations;
use crate::effects::UiEffect;
use crate::events::SessionUiEvent;
use crate::state::AppState;

/// `sendMessage` from the view: uses the current execution mode.
pub fn send_message(app: &mut AppState, text: &str) -> Vec<UiEffect> {
    if app.restart.is_busy() {
        app.reject("A restart is in progress");
        return vec![];
    }
    let mode = app.execution_mode;
    start_send(app, text, mode)
}

/// Starts a session on the selected conversation.
pub fn start_send(app: &mut AppState, text: &str, mode: ExecutionMode) -> Vec<UiEffect> {
    let Some(conversation_id) = app.conversations.selected.clone() else {
        tracing::debug!("send ignored: no conversation selected");
        return vec![];
    };
    if app.send_busy() {
        app.reject("A message is already being processed");
        return vec![];
    }
    if app.rerun.is_busy() {
        app.reject("Wait for the running rerun to finish");
        return vec![];
    }
    if text.trim().is_empty() {
        app.reject("Message is empty");
        return vec![];
    }
    let Some(conversation) = app.conversations.active_mut_if(&conversation_id) else {
        app.reject("Conversation is still loading");
        return vec![];
    };

    let rollback_len = conversation.messages.len();
    conversation.push_exchange(text);
    let message_count = conversation.messages.len();
    if let Some(summary) = app.conversations.summary_mut(&conversation_id) {
        summary.message_count = message_count;
    }

    let task = app.task_seq.next_id();
    let cancel = CancellationToken::new();
    app.tasks.session.start(task, Some(cancel.clone()));
    app.session.begin(&conversation_id, rollback_len);
    tracing::debug!(conversation = %conversation_id, %mode, "starting pipeline session");

    vec![UiEffect::StartSession {
        task,
        conversation_id,
        content: text.to_string(),
        mode,
        cancel,
    }]
}

pub fn handle_session_event(app: &mut AppState, event: SessionUiEvent) -> Vec<UiEffect> {
    match event {
        SessionUiEvent::Event {
            task,
            conversation_id,
            event,
        } => {
            if !app.tasks.session.is_active(task) {
                tracing::debug!(event = event.name(), "dropping event of finished session");
                return vec![];
            }
            tracing::debug!(conversation = %conversation_id, event = event.name(), "pipeline event");

            let signal = match app
                .conversations
                .active_mut_if(&conversation_id)
                .and_then(Conversation::last_assistant_mut)
            {
                Some(message) => apply_event(message, &event),
                None => signal_of(&event),
            };
            handle_signal(app, &conversation_id, signal)
        }
        SessionUiEvent::OpenFailed {
            task,
            conversation_id,
            error,
        } => {
            if app.tasks.session.finish_if_active(task) {
                roll_back(app, &conversation_id);
                app.session.reset();
                app.set_error(format!("Failed to send message: {error}"));
            }
            vec![]
        }
        SessionUiEvent::Aborted {
            task,
            conversation_id,
            error,
        } => {
            if !app.tasks.session.finish_if_active(task) {
                return vec![];
            }
            if let Some(message) = app
                .conversations
                .active_mut_if(&conversation_id)
                .and_then(Conversation::last_assistant_mut)
            {
                message.loading.clear();
            }
            app.session.reset();
            app.set_error(format!("Pipeline stream aborted: {error}"));
            vec![]
        }
    }
}

fn handle_signal(app: &mut AppState, conversation_id: &str, signal: StreamSignal) -> Vec<UiEffect> {
    match signal {
        StreamSignal::Continue => vec![],
        StreamSignal::TitleReady { title } => {
            if let Some(title) = title {
                if let Some(summary) = app.conversations.summary_mut(conversation_id) {
                    summary.title = Some(title.clone());
                }
                if let Some(conversation) = app.conversations.active_mut_if(conversation_id) {
                    conversation.title = Some(title);
                }
            }
            conversations::refresh_list(app)
        }
        StreamSignal::Paused { stage } => {
            tracing::debug!(conversation = conversation_id, %stage, "pipeline paused");
            end_session(app);
            vec![]
        }
        StreamSignal::Complete => {
            end_session(app);
            conversations::refresh_list(app)
        }
        StreamSignal::Failed { message } => {
            end_session(app);
            app.set_error(format!("Pipeline error: {message}"));
            vec![]
        }
    }
}

fn end_session(app: &mut AppState) {
    app.tasks.session.clear();
    app.session.reset();
}

/// Removes the optimistic pair, restoring the prior message sequence.
fn roll_back(app: &mut AppState, conversation_id: &str) {
    let rollback_len = app.session.rollback_len;
    let Some(conversation) = app.conversations.active_mut_if(conversation_id) else {
        return;
    };
    conversation.messages.truncate(rollback_len);
    tracing::warn!(
        conversation = conversation_id,
        messages = rollback_len,
        "rolled back optimistic send"
    );
    if let Some(summary) = app.conversations.summary_mut(conversation_id) {
        summary.message_count = rollback_len;
    }
}
