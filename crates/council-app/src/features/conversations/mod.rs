//! Conversation list reconciler: list refresh, select/load, optimistic
//! create and delete, rename and council configuration.

mod state;
mod update;

pub use state::{ConversationsState, CreatePurpose, PendingDelete};
pub use update::{
    create_conversation, delete_conversation, handle_conversation_event, handle_models_event,
    load_models, refresh_conversation, refresh_list, rename_conversation, select_conversation,
    update_council_config,
};
