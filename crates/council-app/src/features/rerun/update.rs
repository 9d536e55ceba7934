//! Rerun/continue reducer.
//!
//! All four operations address the last assistant message of the active
//! conversation and fail closed: nothing is written until the replacement
//! payload has arrived in full.

use council_core::client::{ContinueOutcome, Stage2Rerun};
use council_core::conversation::{AssistantMessage, Conversation, Stage};

use super::state::{RerunOutcome, RerunRequest, RerunTarget};
use crate::effects::UiEffect;
use crate::events::RerunUiEvent;
use crate::state::AppState;

/// Reruns stage 1 or 2 for one model, or stage 3.
pub fn rerun(app: &mut AppState, request: RerunRequest) -> Vec<UiEffect> {
    if matches!(request, RerunRequest::Continue) {
        return continue_next_stage(app);
    }
    let Some(target) = target_for(app, &request) else {
        return vec![];
    };

    let missing = {
        let message = last_assistant(app);
        match &request {
            RerunRequest::Stage1Model { .. } => message.is_none_or(|m| m.stage1.is_none()),
            RerunRequest::Stage2Model { .. } | RerunRequest::Stage3 => {
                message.is_none_or(|m| m.stage2.is_none())
            }
            RerunRequest::Continue => false,
        }
    };
    if missing {
        app.reject(format!(
            "Nothing to rerun: {} needs the earlier stages first",
            request.label()
        ));
        return vec![];
    }

    begin(app, target, request)
}

/// Runs the next stage of a step-mode pipeline, chosen from message shape.
pub fn continue_next_stage(app: &mut AppState) -> Vec<UiEffect> {
    let request = RerunRequest::Continue;
    let Some(target) = target_for(app, &request) else {
        return vec![];
    };
    if last_assistant(app)
        .and_then(AssistantMessage::next_continuable_stage)
        .is_none()
    {
        tracing::debug!("continue ignored: nothing left to run");
        return vec![];
    }
    begin(app, target, request)
}

fn last_assistant(app: &AppState) -> Option<&AssistantMessage> {
    app.active_conversation().and_then(Conversation::last_assistant)
}

/// Checks the shared preconditions and resolves the addressed message.
fn target_for(app: &mut AppState, request: &RerunRequest) -> Option<RerunTarget> {
    let label = request.label();
    if app.rerun.is_busy() {
        app.reject(format!("Cannot start {label}: another rerun is in progress"));
        return None;
    }
    if app.send_busy() || app.restart.is_busy() {
        app.reject(format!("Cannot start {label} while a message is streaming"));
        return None;
    }
    let target = app.active_conversation().and_then(|conversation| {
        conversation
            .last_assistant_index()
            .map(|message_index| RerunTarget {
                conversation_id: conversation.id.clone(),
                message_index,
            })
    });
    if target.is_none() {
        tracing::debug!(request = label, "ignored: no assistant message to address");
    }
    target
}

fn begin(app: &mut AppState, target: RerunTarget, request: RerunRequest) -> Vec<UiEffect> {
    let task = app.task_seq.next_id();
    app.tasks.rerun.start(task, None);
    app.rerun.begin(&request);
    tracing::debug!(
        conversation = %target.conversation_id,
        message = target.message_index,
        request = request.label(),
        "starting rerun"
    );
    vec![UiEffect::RunRerun {
        task,
        target,
        request,
    }]
}

pub fn handle_rerun_event(app: &mut AppState, event: RerunUiEvent) -> Vec<UiEffect> {
    match event {
        RerunUiEvent::Finished {
            task,
            target,
            outcome,
        } => {
            if !app.tasks.rerun.finish_if_active(task) {
                tracing::debug!("dropping stale rerun result");
                return vec![];
            }
            app.rerun.clear();

            let message = app
                .conversations
                .active_mut_if(&target.conversation_id)
                .filter(|c| c.last_assistant_index() == Some(target.message_index))
                .and_then(Conversation::last_assistant_mut);
            match message {
                Some(message) => merge(message, outcome),
                None => tracing::debug!(
                    conversation = %target.conversation_id,
                    "rerun result no longer matches the active conversation"
                ),
            }
        }
        RerunUiEvent::Failed {
            task,
            target: _,
            error,
        } => {
            if app.tasks.rerun.finish_if_active(task) {
                app.rerun.clear();
                app.set_error(format!("Rerun failed: {error}"));
            }
        }
    }
    vec![]
}

/// Applies a rerun result in one step.
fn merge(message: &mut AssistantMessage, outcome: RerunOutcome) {
    match outcome {
        RerunOutcome::Stage1(stage1) => message.stage1 = Some(stage1),
        RerunOutcome::Stage2(Stage2Rerun { stage2, metadata }) => {
            // Rankings and the metadata describing them land together.
            message.stage2 = Some(stage2);
            message.metadata = Some(metadata);
        }
        RerunOutcome::Stage3(stage3) => message.stage3 = Some(stage3),
        RerunOutcome::Continued(ContinueOutcome::Stage2 { data, metadata }) => {
            if message.stage1.is_none() {
                tracing::warn!("continue returned stage2 for a message without stage1; ignored");
                return;
            }
            message.stage2 = Some(data);
            message.metadata = Some(metadata);
            message.paused = Some(Stage::Stage2);
        }
        RerunOutcome::Continued(ContinueOutcome::Stage3 { data }) => {
            if message.stage2.is_none() {
                tracing::warn!("continue returned stage3 for a message without stage2; ignored");
                return;
            }
            message.stage3 = Some(data);
            message.paused = None;
        }
        RerunOutcome::Continued(ContinueOutcome::Complete) => {
            tracing::debug!("continue: pipeline already complete");
        }
    }
}
