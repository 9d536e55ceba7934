//! Conversation feature reducer.
//!
//! Handles the sidebar list (refresh, optimistic create/delete), selection
//! and loading of the active conversation, rename and council config.

use council_core::client::CouncilConfig;
use council_core::conversation::{normalize_model_ids, normalize_title};

use super::state::{CreatePurpose, PendingDelete};
use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::events::{ConversationUiEvent, ModelsUiEvent};
use crate::restart;
use crate::state::AppState;

// ============================================================================
// Commands
// ============================================================================

/// Reloads the summary list. A newer refresh supersedes an older one.
pub fn refresh_list(app: &mut AppState) -> Vec<UiEffect> {
    let task = app.task_seq.next_id();
    app.tasks.conversation_list.start(task, None);
    vec![UiEffect::LoadConversationList { task }]
}

pub fn create_conversation(app: &mut AppState) -> Vec<UiEffect> {
    if app.tasks.conversation_create.is_running() {
        tracing::debug!("create ignored: a conversation is already being created");
        return vec![];
    }
    let task = app.task_seq.next_id();
    app.tasks.conversation_create.start(task, None);
    vec![UiEffect::CreateConversation {
        task,
        purpose: CreatePurpose::Open,
    }]
}

pub fn select_conversation(app: &mut AppState, id: String) -> Vec<UiEffect> {
    if app.conversations.is_delete_pending(&id) {
        app.reject(format!("Conversation {id} is being deleted"));
        return vec![];
    }
    app.conversations.selected = Some(id.clone());
    app.conversations.active = None;
    load(app, id)
}

/// Reloads the selected conversation, keeping the current copy until the
/// fresh one arrives.
pub fn refresh_conversation(app: &mut AppState) -> Vec<UiEffect> {
    match app.conversations.selected.clone() {
        Some(id) => load(app, id),
        None => {
            tracing::debug!("refresh ignored: no conversation selected");
            vec![]
        }
    }
}

fn load(app: &mut AppState, id: String) -> Vec<UiEffect> {
    let task = app.task_seq.next_id();
    app.tasks.conversation_load.start(task, None);
    vec![UiEffect::LoadConversation { task, id }]
}

/// Optimistically removes `id`, remembering the list as it was.
pub fn delete_conversation(app: &mut AppState, id: &str) -> Vec<UiEffect> {
    if app.conversations.is_delete_pending(id) {
        tracing::debug!(conversation = id, "delete ignored: already pending");
        return vec![];
    }

    let snapshot = app.conversations.list.clone();
    app.conversations.list.retain(|summary| summary.id != id);
    app.conversations.pending_deletes.push(PendingDelete {
        id: id.to_string(),
        snapshot,
    });

    let mut effects = Vec::new();
    if app.conversations.is_selected(id) {
        app.conversations.clear_selection();
        app.tasks.conversation_load.clear();
    }
    if app.send_busy() && app.session.is_for(id) {
        tracing::debug!(conversation = id, "cancelling stream of deleted conversation");
        effects.push(UiEffect::CancelTask {
            kind: TaskKind::Session,
            token: app.tasks.cancel(TaskKind::Session),
        });
        app.session.reset();
    }
    effects.push(UiEffect::DeleteConversation { id: id.to_string() });
    effects
}

pub fn rename_conversation(app: &mut AppState, id: String, title: &str) -> Vec<UiEffect> {
    let title = match normalize_title(title) {
        Ok(title) => title,
        Err(err) => {
            app.reject(err.to_string());
            return vec![];
        }
    };
    let task = app.task_seq.next_id();
    app.tasks.conversation_rename.start(task, None);
    vec![UiEffect::RenameConversation { task, id, title }]
}

pub fn update_council_config(
    app: &mut AppState,
    council_models: Option<Vec<String>>,
    chairman_model: Option<String>,
) -> Vec<UiEffect> {
    let Some(id) = app.active_conversation().map(|c| c.id.clone()) else {
        app.reject("No conversation selected");
        return vec![];
    };

    let council_models = council_models.map(|models| normalize_model_ids(&models));
    if council_models.as_ref().is_some_and(Vec::is_empty) {
        app.reject("At least one council model is required");
        return vec![];
    }
    let chairman_model = chairman_model
        .map(|model| model.trim().to_string())
        .filter(|model| !model.is_empty());
    if council_models.is_none() && chairman_model.is_none() {
        app.reject("Nothing to update");
        return vec![];
    }

    let task = app.task_seq.next_id();
    app.tasks.council_config.start(task, None);
    vec![UiEffect::UpdateCouncilConfig {
        task,
        id,
        config: CouncilConfig {
            council_models,
            chairman_model,
        },
    }]
}

pub fn load_models(app: &mut AppState) -> Vec<UiEffect> {
    let task = app.task_seq.next_id();
    app.tasks.models.start(task, None);
    vec![UiEffect::LoadModels { task }]
}

// ============================================================================
// Results
// ============================================================================

pub fn handle_conversation_event(app: &mut AppState, event: ConversationUiEvent) -> Vec<UiEffect> {
    match event {
        ConversationUiEvent::ListLoaded {
            task,
            conversations,
        } => {
            if app.tasks.conversation_list.finish_if_active(task) {
                app.conversations.replace_list(conversations);
            }
            vec![]
        }
        ConversationUiEvent::ListFailed { task, error } => {
            if app.tasks.conversation_list.finish_if_active(task) {
                app.set_error(format!("Failed to load conversations: {error}"));
            }
            vec![]
        }
        ConversationUiEvent::Loaded { task, conversation } => {
            if !app.tasks.conversation_load.finish_if_active(task)
                || !app.conversations.is_selected(&conversation.id)
            {
                tracing::debug!(conversation = %conversation.id, "dropping stale load result");
                return vec![];
            }
            app.conversations.sync_summary(&conversation);
            app.conversations.active = Some(conversation);
            vec![]
        }
        ConversationUiEvent::LoadFailed { task, id, error } => {
            if app.tasks.conversation_load.finish_if_active(task) {
                app.set_error(format!("Failed to load conversation {id}: {error}"));
            }
            vec![]
        }
        ConversationUiEvent::Created {
            task,
            purpose,
            conversation,
        } => match purpose {
            CreatePurpose::Open => {
                if app.tasks.conversation_create.finish_if_active(task) {
                    app.conversations.prepend(conversation.summary());
                    app.conversations.selected = Some(conversation.id.clone());
                    app.conversations.active = Some(conversation);
                    app.tasks.conversation_load.clear();
                }
                vec![]
            }
            CreatePurpose::Restart { prompt, mode } => {
                restart::handle_restart_created(app, task, prompt, mode, conversation)
            }
        },
        ConversationUiEvent::CreateFailed {
            task,
            purpose,
            error,
        } => match purpose {
            CreatePurpose::Open => {
                if app.tasks.conversation_create.finish_if_active(task) {
                    app.set_error(format!("Failed to create conversation: {error}"));
                }
                vec![]
            }
            CreatePurpose::Restart { .. } => restart::handle_restart_create_failed(app, task, &error),
        },
        ConversationUiEvent::Deleted { id } => {
            app.conversations.take_pending_delete(&id);
            tracing::debug!(conversation = %id, "delete confirmed");
            vec![]
        }
        ConversationUiEvent::DeleteFailed { id, error } => {
            if let Some(pending) = app.conversations.take_pending_delete(&id) {
                app.conversations.list = pending.snapshot;
                tracing::warn!(conversation = %id, "delete failed; restored conversation list");
                app.set_error(format!("Failed to delete conversation {id}: {error}"));
            }
            vec![]
        }
        ConversationUiEvent::Renamed { task, id, title } => {
            if app.tasks.conversation_rename.finish_if_active(task) {
                if let Some(summary) = app.conversations.summary_mut(&id) {
                    summary.title = Some(title.clone());
                }
                if let Some(conversation) = app.conversations.active_mut_if(&id) {
                    conversation.title = Some(title.clone());
                }
                app.set_info(format!("Renamed to {title}"));
            }
            vec![]
        }
        ConversationUiEvent::RenameFailed { task, id, error } => {
            if app.tasks.conversation_rename.finish_if_active(task) {
                app.set_error(format!("Failed to rename conversation {id}: {error}"));
            }
            vec![]
        }
        ConversationUiEvent::ConfigUpdated { task, id, config } => {
            if app.tasks.council_config.finish_if_active(task)
                && let Some(conversation) = app.conversations.active_mut_if(&id)
            {
                conversation.council_models = config.council_models;
                conversation.chairman_model = config.chairman_model;
            }
            vec![]
        }
        ConversationUiEvent::ConfigFailed { task, id, error } => {
            if app.tasks.council_config.finish_if_active(task) {
                app.set_error(format!("Failed to update council of {id}: {error}"));
            }
            vec![]
        }
    }
}

pub fn handle_models_event(app: &mut AppState, event: ModelsUiEvent) -> Vec<UiEffect> {
    match event {
        ModelsUiEvent::Loaded { task, catalog } => {
            if app.tasks.models.finish_if_active(task) {
                app.models = Some(catalog);
            }
        }
        ModelsUiEvent::Failed { task, error } => {
            if app.tasks.models.finish_if_active(task) {
                app.set_error(format!("Failed to load models: {error}"));
            }
        }
    }
    vec![]
}
