use anyhow::Result;
use council_core::client::CouncilClient;

use crate::common::TaskId;
use crate::events::{RerunUiEvent, UiEvent};
use crate::rerun::{RerunOutcome, RerunRequest, RerunTarget};

/// Runs one rerun-family request against the addressed message.
pub async fn run_rerun(
    client: CouncilClient,
    task: TaskId,
    target: RerunTarget,
    request: RerunRequest,
) -> UiEvent {
    let event = match request_outcome(&client, &target, &request).await {
        Ok(outcome) => RerunUiEvent::Finished {
            task,
            target,
            outcome,
        },
        Err(e) => RerunUiEvent::Failed {
            task,
            target,
            error: format!("{e:#}"),
        },
    };
    UiEvent::Rerun(event)
}

async fn request_outcome(
    client: &CouncilClient,
    target: &RerunTarget,
    request: &RerunRequest,
) -> Result<RerunOutcome> {
    let id = target.conversation_id.as_str();
    let index = target.message_index;
    Ok(match request {
        RerunRequest::Stage1Model { model } => {
            RerunOutcome::Stage1(client.rerun_stage1_model(id, index, model).await?)
        }
        RerunRequest::Stage2Model { model } => {
            RerunOutcome::Stage2(client.rerun_stage2_model(id, index, model).await?)
        }
        RerunRequest::Stage3 => RerunOutcome::Stage3(client.rerun_stage3(id, index).await?),
        RerunRequest::Continue => RerunOutcome::Continued(client.continue_stage(id, index).await?),
    })
}
