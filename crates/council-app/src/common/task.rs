use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    ConversationList,
    ConversationLoad,
    ConversationCreate,
    ConversationRename,
    CouncilConfig,
    Models,
    Session,
    Rerun,
    RestartCreate,
}

/// Task lifecycle state (stored in AppState, mutated only by reducer).
///
/// Results carry the `TaskId` they were started with; a result whose id is
/// no longer active is stale and gets dropped.
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
    pub cancel: Option<CancellationToken>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(&mut self, id: TaskId, cancel: Option<CancellationToken>) {
        self.active = Some(id);
        self.cancel = cancel;
    }

    pub fn is_active(&self, id: TaskId) -> bool {
        self.active == Some(id)
    }

    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.clear();
        }
        ok
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.cancel = None;
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub conversation_list: TaskState,
    pub conversation_load: TaskState,
    pub conversation_create: TaskState,
    pub conversation_rename: TaskState,
    pub council_config: TaskState,
    pub models: TaskState,
    pub session: TaskState,
    pub rerun: TaskState,
    pub restart_create: TaskState,
}

impl Tasks {
    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::ConversationList => &mut self.conversation_list,
            TaskKind::ConversationLoad => &mut self.conversation_load,
            TaskKind::ConversationCreate => &mut self.conversation_create,
            TaskKind::ConversationRename => &mut self.conversation_rename,
            TaskKind::CouncilConfig => &mut self.council_config,
            TaskKind::Models => &mut self.models,
            TaskKind::Session => &mut self.session,
            TaskKind::Rerun => &mut self.rerun,
            TaskKind::RestartCreate => &mut self.restart_create,
        }
    }

    /// Clears the `kind` slot and hands back its cancellation token.
    pub fn cancel(&mut self, kind: TaskKind) -> Option<CancellationToken> {
        let state = self.state_mut(kind);
        let token = state.cancel.take();
        state.clear();
        token
    }

    pub fn is_any_running(&self) -> bool {
        self.conversation_list.is_running()
            || self.conversation_load.is_running()
            || self.conversation_create.is_running()
            || self.conversation_rename.is_running()
            || self.council_config.is_running()
            || self.models.is_running()
            || self.session.is_running()
            || self.rerun.is_running()
            || self.restart_create.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_if_active_ignores_stale_ids() {
        let mut seq = TaskSeq::default();
        let first = seq.next_id();
        let second = seq.next_id();

        let mut state = TaskState::default();
        state.start(first, None);
        state.start(second, Some(CancellationToken::new()));

        assert!(!state.finish_if_active(first));
        assert!(state.is_running());
        assert!(state.finish_if_active(second));
        assert!(!state.is_running());
        assert!(state.cancel.is_none());
    }

    #[test]
    fn test_cancel_takes_token_and_clears_slot() {
        let mut tasks = Tasks::default();
        let token = CancellationToken::new();
        tasks.session.start(TaskId(7), Some(token.clone()));

        let taken = tasks.cancel(TaskKind::Session).unwrap();
        taken.cancel();
        assert!(token.is_cancelled());
        assert!(!tasks.session.is_running());
        assert!(tasks.cancel(TaskKind::Session).is_none());
    }
}
