/// Bookkeeping for the in-flight send.
///
/// Busy-ness lives in `Tasks::session`; this holds what the reducer needs to
/// route events and roll back.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Conversation the stream belongs to.
    pub conversation_id: Option<String>,
    /// Message count before the optimistic append.
    pub rollback_len: usize,
}

impl SessionState {
    pub fn begin(&mut self, conversation_id: &str, rollback_len: usize) {
        self.conversation_id = Some(conversation_id.to_string());
        self.rollback_len = rollback_len;
    }

    pub fn is_for(&self, conversation_id: &str) -> bool {
        self.conversation_id.as_deref() == Some(conversation_id)
    }

    pub fn reset(&mut self) {
        *self = SessionState::default();
    }
}
