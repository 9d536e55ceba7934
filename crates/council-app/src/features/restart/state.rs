#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartPhase {
    /// Waiting for the replacement conversation.
    Provisioning,
    /// Replacement selected; waiting out the settle delay.
    Settling { conversation_id: String },
    /// Edited prompt is streaming in the replacement.
    Replaying { conversation_id: String },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RestartState {
    pub phase: Option<RestartPhase>,
}

impl RestartState {
    pub fn is_busy(&self) -> bool {
        self.phase.is_some()
    }
}
