//! Application reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crate::effects::UiEffect;
use crate::events::{Command, UiEvent};
use crate::rerun::RerunRequest;
use crate::state::AppState;
use crate::{conversations, rerun, restart, session};

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    let effects = match event {
        UiEvent::Command(command) => handle_command(app, command),
        UiEvent::Conversation(event) => conversations::handle_conversation_event(app, event),
        UiEvent::Session(event) => session::handle_session_event(app, event),
        UiEvent::Rerun(event) => rerun::handle_rerun_event(app, event),
        UiEvent::Restart(event) => restart::handle_restart_event(app, event),
        UiEvent::Models(event) => conversations::handle_models_event(app, event),
    };
    restart::reconcile(app);
    effects
}

fn handle_command(app: &mut AppState, command: Command) -> Vec<UiEffect> {
    match command {
        Command::RefreshConversations => conversations::refresh_list(app),
        Command::CreateConversation => conversations::create_conversation(app),
        Command::SelectConversation { id } => conversations::select_conversation(app, id),
        Command::RefreshConversation => conversations::refresh_conversation(app),
        Command::DeleteConversation { id } => conversations::delete_conversation(app, &id),
        Command::RenameConversation { id, title } => {
            conversations::rename_conversation(app, id, &title)
        }
        Command::UpdateCouncilConfig {
            council_models,
            chairman_model,
        } => conversations::update_council_config(app, council_models, chairman_model),
        Command::LoadModels => conversations::load_models(app),
        Command::SendMessage { text } => session::send_message(app, &text),
        Command::EditLastPromptAndRestart { text } => restart::edit_and_restart(app, &text),
        Command::RerunStage1Model { model } => {
            rerun::rerun(app, RerunRequest::Stage1Model { model })
        }
        Command::RerunStage2Model { model } => {
            rerun::rerun(app, RerunRequest::Stage2Model { model })
        }
        Command::RerunStage3 => rerun::rerun(app, RerunRequest::Stage3),
        Command::ContinueNextStage => rerun::continue_next_stage(app),
        Command::SetExecutionMode { mode } => {
            tracing::debug!(%mode, "execution mode changed");
            app.execution_mode = mode;
            vec![]
        }
    }
}

#[cfg(test)]
mod tests;
