use council_core::client::{CouncilClient, CouncilConfig};

use crate::common::TaskId;
use crate::conversations::CreatePurpose;
use crate::events::{ConversationUiEvent, ModelsUiEvent, UiEvent};

/// Loads the conversation summaries.
pub async fn conversation_list_load(client: CouncilClient, task: TaskId) -> UiEvent {
    let event = match client.list_conversations().await {
        Ok(conversations) => ConversationUiEvent::ListLoaded {
            task,
            conversations,
        },
        Err(e) => ConversationUiEvent::ListFailed {
            task,
            error: format!("{e:#}"),
        },
    };
    UiEvent::Conversation(event)
}

pub async fn conversation_load(client: CouncilClient, task: TaskId, id: String) -> UiEvent {
    let event = match client.get_conversation(&id).await {
        Ok(conversation) => ConversationUiEvent::Loaded { task, conversation },
        Err(e) => ConversationUiEvent::LoadFailed {
            task,
            id,
            error: format!("{e:#}"),
        },
    };
    UiEvent::Conversation(event)
}

/// Creates a conversation; `purpose` is handed back untouched.
pub async fn conversation_create(
    client: CouncilClient,
    task: TaskId,
    purpose: CreatePurpose,
) -> UiEvent {
    let event = match client.create_conversation().await {
        Ok(conversation) => {
            tracing::info!(conversation = %conversation.id, "conversation created");
            ConversationUiEvent::Created {
                task,
                purpose,
                conversation,
            }
        }
        Err(e) => ConversationUiEvent::CreateFailed {
            task,
            purpose,
            error: format!("{e:#}"),
        },
    };
    UiEvent::Conversation(event)
}

pub async fn conversation_delete(client: CouncilClient, id: String) -> UiEvent {
    let event = match client.delete_conversation(&id).await {
        Ok(()) => ConversationUiEvent::Deleted { id },
        Err(e) => ConversationUiEvent::DeleteFailed {
            id,
            error: format!("{e:#}"),
        },
    };
    UiEvent::Conversation(event)
}

pub async fn conversation_rename(
    client: CouncilClient,
    task: TaskId,
    id: String,
    title: String,
) -> UiEvent {
    let event = match client.rename_conversation(&id, &title).await {
        Ok(title) => ConversationUiEvent::Renamed { task, id, title },
        Err(e) => ConversationUiEvent::RenameFailed {
            task,
            id,
            error: format!("{e:#}"),
        },
    };
    UiEvent::Conversation(event)
}

pub async fn council_config_update(
    client: CouncilClient,
    task: TaskId,
    id: String,
    config: CouncilConfig,
) -> UiEvent {
    let event = match client.update_council_config(&id, &config).await {
        Ok(config) => ConversationUiEvent::ConfigUpdated { task, id, config },
        Err(e) => ConversationUiEvent::ConfigFailed {
            task,
            id,
            error: format!("{e:#}"),
        },
    };
    UiEvent::Conversation(event)
}

pub async fn models_load(client: CouncilClient, task: TaskId) -> UiEvent {
    let event = match client.list_models().await {
        Ok(catalog) => ModelsUiEvent::Loaded { task, catalog },
        Err(e) => ModelsUiEvent::Failed {
            task,
            error: format!("{e:#}"),
        },
    };
    UiEvent::Models(event)
}
