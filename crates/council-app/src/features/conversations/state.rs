use council_core::conversation::{Conversation, ConversationSummary, ExecutionMode};

/// Why a conversation is being created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatePurpose {
    /// Plain "new conversation": prepend and select.
    Open,
    /// Replacement conversation for an edit-and-restart.
    Restart { prompt: String, mode: ExecutionMode },
}

/// An optimistic delete waiting for the backend.
///
/// Owns the list exactly as it was when the delete was issued; a failed
/// delete restores that list verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub id: String,
    pub snapshot: Vec<ConversationSummary>,
}

#[derive(Debug, Default, Clone)]
pub struct ConversationsState {
    /// Sidebar list, newest first.
    pub list: Vec<ConversationSummary>,
    pub selected: Option<String>,
    /// Full copy of the selected conversation once loaded.
    pub active: Option<Conversation>,
    pub pending_deletes: Vec<PendingDelete>,
}

impl ConversationsState {
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    /// The active conversation, if it is `id`.
    pub fn active_mut_if(&mut self, id: &str) -> Option<&mut Conversation> {
        self.active.as_mut().filter(|c| c.id == id)
    }

    pub fn is_delete_pending(&self, id: &str) -> bool {
        self.pending_deletes.iter().any(|pending| pending.id == id)
    }

    pub fn take_pending_delete(&mut self, id: &str) -> Option<PendingDelete> {
        let index = self.pending_deletes.iter().position(|p| p.id == id)?;
        Some(self.pending_deletes.remove(index))
    }

    pub fn summary_mut(&mut self, id: &str) -> Option<&mut ConversationSummary> {
        self.list.iter_mut().find(|summary| summary.id == id)
    }

    /// Puts `summary` at the top of the list, replacing an older entry.
    pub fn prepend(&mut self, summary: ConversationSummary) {
        self.list.retain(|existing| existing.id != summary.id);
        self.list.insert(0, summary);
    }

    /// Copies title and message count of `conversation` into its summary.
    pub fn sync_summary(&mut self, conversation: &Conversation) {
        if let Some(summary) = self.summary_mut(&conversation.id) {
            summary.title.clone_from(&conversation.title);
            summary.message_count = conversation.messages.len();
        }
    }

    /// Replaces the list with a fresh backend listing.
    ///
    /// Ids with a delete still in flight stay hidden.
    /// The loaded conversation's message count wins over the listing's; a
    /// listed title is adopted by the loaded conversation.
    pub fn replace_list(&mut self, conversations: Vec<ConversationSummary>) {
        let pending = &self.pending_deletes;
        self.list = conversations
            .into_iter()
            .filter(|summary| !pending.iter().any(|p| p.id == summary.id))
            .collect();

        let Some(active) = self.active.as_mut() else {
            return;
        };
        if let Some(summary) = self.list.iter_mut().find(|s| s.id == active.id) {
            summary.message_count = active.messages.len();
            if summary.title.is_some() {
                active.title.clone_from(&summary.title);
            } else {
                summary.title.clone_from(&active.title);
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.active = None;
    }
}
