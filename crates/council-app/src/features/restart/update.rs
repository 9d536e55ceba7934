//! Edit-and-restart reducer.
//!
//! Replaces the last prompt by provisioning a fresh conversation and
//! replaying the edited prompt there:
//!
//! ```text
//! Provisioning ──created──▶ Settling ──settled──▶ Replaying ──send ends──▶ idle
//!      │                       │
//!      └──create failed──▶ idle└──deselected──▶ idle
//! ```
//!
//! The source conversation is never modified.

use council_core::conversation::{Conversation, ExecutionMode};

use super::state::RestartPhase;
use crate::common::TaskId;
use crate::conversations::CreatePurpose;
use crate::effects::UiEffect;
use crate::events::RestartUiEvent;
use crate::session;
use crate::state::AppState;

pub fn edit_and_restart(app: &mut AppState, text: &str) -> Vec<UiEffect> {
    if app.send_busy() {
        app.reject("Cannot restart while a message is streaming");
        return vec![];
    }
    if app.restart.is_busy() {
        app.reject("A restart is already in progress");
        return vec![];
    }
    let prompt = text.trim();
    if prompt.is_empty() {
        app.reject("Edited prompt is empty");
        return vec![];
    }
    if app
        .active_conversation()
        .and_then(Conversation::last_prompt)
        .is_none()
    {
        app.reject("Nothing to restart: the conversation has no prompt yet");
        return vec![];
    }

    let mode = app.execution_mode;
    tracing::info!(%mode, "restarting with edited prompt in a new conversation");

    // Leave the source conversation behind entirely.
    app.conversations.clear_selection();
    app.tasks.conversation_load.clear();
    app.tasks.rerun.clear();
    app.rerun.clear();

    let task = app.task_seq.next_id();
    app.tasks.restart_create.start(task, None);
    app.restart.phase = Some(RestartPhase::Provisioning);
    vec![UiEffect::CreateConversation {
        task,
        purpose: CreatePurpose::Restart {
            prompt: prompt.to_string(),
            mode,
        },
    }]
}

/// The replacement conversation exists: select it and wait out the settle
/// delay before replaying.
pub fn handle_restart_created(
    app: &mut AppState,
    task: TaskId,
    prompt: String,
    mode: ExecutionMode,
    conversation: Conversation,
) -> Vec<UiEffect> {
    if !app.tasks.restart_create.finish_if_active(task) {
        tracing::debug!(conversation = %conversation.id, "dropping stale restart conversation");
        return vec![];
    }
    let conversation_id = conversation.id.clone();
    app.conversations.prepend(conversation.summary());
    app.conversations.selected = Some(conversation_id.clone());
    app.conversations.active = Some(conversation);
    app.tasks.conversation_load.clear();

    app.restart.phase = Some(RestartPhase::Settling {
        conversation_id: conversation_id.clone(),
    });
    vec![UiEffect::SettleRestart {
        conversation_id,
        prompt,
        mode,
        delay: app.restart_settle,
    }]
}

pub fn handle_restart_create_failed(app: &mut AppState, task: TaskId, error: &str) -> Vec<UiEffect> {
    if app.tasks.restart_create.finish_if_active(task) {
        app.restart.phase = None;
        app.set_error(format!("Restart failed: {error}"));
    }
    vec![]
}

pub fn handle_restart_event(app: &mut AppState, event: RestartUiEvent) -> Vec<UiEffect> {
    match event {
        RestartUiEvent::Settled {
            conversation_id,
            prompt,
            mode,
        } => {
            let settling = matches!(
                &app.restart.phase,
                Some(RestartPhase::Settling { conversation_id: id }) if *id == conversation_id
            );
            if !settling {
                tracing::debug!(conversation = %conversation_id, "ignoring stale restart settle");
                return vec![];
            }
            if !app.conversations.is_selected(&conversation_id) {
                tracing::info!(conversation = %conversation_id, "restart abandoned: selection changed");
                app.restart.phase = None;
                return vec![];
            }

            let effects = session::start_send(app, &prompt, mode);
            app.restart.phase = if app.send_busy() && app.session.is_for(&conversation_id) {
                Some(RestartPhase::Replaying { conversation_id })
            } else {
                None
            };
            effects
        }
    }
}

/// Ends the restart once its replay session is over.
pub fn reconcile(app: &mut AppState) {
    if let Some(RestartPhase::Replaying { conversation_id }) = &app.restart.phase
        && !(app.send_busy() && app.session.is_for(conversation_id))
    {
        tracing::debug!(conversation = %conversation_id, "restart finished");
        app.restart.phase = None;
    }
}

#[cfg(test)]
mod tests {
    use council_core::conversation::{ConversationSummary, Message};

    use super::*;
    use crate::events::{ConversationUiEvent, UiEvent};
    use crate::update::update;

    fn source() -> Conversation {
        Conversation {
            id: "src".into(),
            created_at: String::new(),
            title: Some("Original".into()),
            messages: vec![Message::user("old prompt"), Message::assistant()],
            council_models: None,
            chairman_model: None,
        }
    }

    fn fresh(id: &str) -> Conversation {
        Conversation {
            id: id.into(),
            created_at: String::new(),
            title: None,
            messages: vec![],
            council_models: None,
            chairman_model: None,
        }
    }

    fn app_on_source() -> AppState {
        let mut app = AppState::default();
        app.conversations.list = vec![source().summary()];
        app.conversations.selected = Some("src".into());
        app.conversations.active = Some(source());
        app
    }

    fn provision(app: &mut AppState, text: &str) -> (TaskId, CreatePurpose) {
        match edit_and_restart(app, text).remove(0) {
            UiEffect::CreateConversation { task, purpose } => (task, purpose),
            other => panic!("expected CreateConversation, got {other:?}"),
        }
    }

    #[test]
    fn test_restart_requires_prompt_and_idle_session() {
        let mut app = AppState::default();
        assert!(edit_and_restart(&mut app, "new").is_empty());

        let mut app = app_on_source();
        assert!(edit_and_restart(&mut app, "  ").is_empty());
        assert!(!app.restart.is_busy());
    }

    #[test]
    fn test_created_selects_replacement_and_settles() {
        let mut app = app_on_source();
        let (task, purpose) = provision(&mut app, " new prompt ");
        assert!(app.conversations.selected.is_none());
        assert!(app.busy().restart_busy);
        assert_eq!(
            purpose,
            CreatePurpose::Restart {
                prompt: "new prompt".into(),
                mode: ExecutionMode::Step,
            }
        );

        let effects = update(
            &mut app,
            UiEvent::Conversation(ConversationUiEvent::Created {
                task,
                purpose,
                conversation: fresh("new"),
            }),
        );
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::SettleRestart { conversation_id, prompt, .. }]
                if conversation_id == "new" && prompt == "new prompt"
        ));
        let ids: Vec<&str> = app
            .conversations
            .list
            .iter()
            .map(|s: &ConversationSummary| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["new", "src"]);
        assert_eq!(app.conversations.selected.as_deref(), Some("new"));
    }

    #[test]
    fn test_settle_after_selection_change_abandons() {
        let mut app = app_on_source();
        let (task, purpose) = provision(&mut app, "new prompt");
        update(
            &mut app,
            UiEvent::Conversation(ConversationUiEvent::Created {
                task,
                purpose,
                conversation: fresh("new"),
            }),
        );
        app.conversations.selected = Some("src".into());

        let effects = update(
            &mut app,
            UiEvent::Restart(RestartUiEvent::Settled {
                conversation_id: "new".into(),
                prompt: "new prompt".into(),
                mode: ExecutionMode::Step,
            }),
        );
        assert!(effects.is_empty());
        assert!(!app.restart.is_busy());
        assert!(!app.send_busy());
    }

    #[test]
    fn test_create_failure_clears_restart() {
        let mut app = app_on_source();
        let (task, purpose) = provision(&mut app, "new prompt");
        update(
            &mut app,
            UiEvent::Conversation(ConversationUiEvent::CreateFailed {
                task,
                purpose,
                error: "HTTP 503".into(),
            }),
        );
        assert!(!app.restart.is_busy());
        assert_eq!(app.conversations.list.len(), 1);
        assert!(app.status.as_ref().is_some_and(|s| s.is_error()));
    }
}
