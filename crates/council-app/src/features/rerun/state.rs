use council_core::client::{ContinueOutcome, Stage2Rerun};
use council_core::conversation::{Stage1Response, Stage3Result};

/// The message a rerun-family request addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RerunTarget {
    pub conversation_id: String,
    pub message_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RerunRequest {
    Stage1Model { model: String },
    Stage2Model { model: String },
    Stage3,
    Continue,
}

impl RerunRequest {
    pub fn label(&self) -> &'static str {
        match self {
            RerunRequest::Stage1Model { .. } => "stage1 rerun",
            RerunRequest::Stage2Model { .. } => "stage2 rerun",
            RerunRequest::Stage3 => "stage3 rerun",
            RerunRequest::Continue => "continue",
        }
    }
}

/// Replacement data returned by a successful rerun-family request.
#[derive(Debug, Clone, PartialEq)]
pub enum RerunOutcome {
    Stage1(Vec<Stage1Response>),
    Stage2(Stage2Rerun),
    Stage3(Stage3Result),
    Continued(ContinueOutcome),
}

/// Busy indicators of the rerun family. At most one is set at a time.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RerunState {
    pub stage1_model: Option<String>,
    pub stage2_model: Option<String>,
    pub stage3_busy: bool,
    pub continue_busy: bool,
}

impl RerunState {
    pub fn is_busy(&self) -> bool {
        self.stage1_model.is_some()
            || self.stage2_model.is_some()
            || self.stage3_busy
            || self.continue_busy
    }

    pub fn begin(&mut self, request: &RerunRequest) {
        match request {
            RerunRequest::Stage1Model { model } => self.stage1_model = Some(model.clone()),
            RerunRequest::Stage2Model { model } => self.stage2_model = Some(model.clone()),
            RerunRequest::Stage3 => self.stage3_busy = true,
            RerunRequest::Continue => self.continue_busy = true,
        }
    }

    pub fn clear(&mut self) {
        *self = RerunState::default();
    }
}
