//! Reducer scenarios across features.
//!
//! Each test plays the runtime by hand: it issues commands, inspects the
//! effects, and feeds back the events the backend would produce.

use council_core::client::{ContinueOutcome, Stage2Rerun};
use council_core::conversation::{
    AggregateRanking, AssistantMessage, Conversation, ConversationSummary, ExecutionMode, Message,
    RankingMetadata, Stage, Stage1Response, Stage2Ranking, Stage3Result,
};
use council_core::events::CouncilEvent;

use super::update;
use crate::common::TaskId;
use crate::effects::UiEffect;
use crate::events::{
    Command, ConversationUiEvent, RerunUiEvent, RestartUiEvent, SessionUiEvent, UiEvent,
};
use crate::rerun::{RerunOutcome, RerunTarget};
use crate::state::AppState;

// ----------------------------------------------------------------------------
// Fixtures
// ----------------------------------------------------------------------------

fn summary(id: &str) -> ConversationSummary {
    ConversationSummary {
        id: id.to_string(),
        created_at: "2026-01-01T00:00:00Z".into(),
        title: None,
        message_count: 0,
    }
}

fn conversation(id: &str, messages: Vec<Message>) -> Conversation {
    Conversation {
        id: id.to_string(),
        created_at: "2026-01-01T00:00:00Z".into(),
        title: None,
        messages,
        council_models: None,
        chairman_model: None,
    }
}

fn stage1_data() -> Vec<Stage1Response> {
    vec![
        Stage1Response {
            model: "openai/gpt-4o".into(),
            response: "Answer A".into(),
        },
        Stage1Response {
            model: "anthropic/claude".into(),
            response: "Answer B".into(),
        },
    ]
}

fn stage2_data() -> Vec<Stage2Ranking> {
    vec![Stage2Ranking {
        model: "openai/gpt-4o".into(),
        ranking: "FINAL RANKING:\n1. Response B\n2. Response A".into(),
        parsed_ranking: vec!["Response B".into(), "Response A".into()],
    }]
}

fn metadata(average_rank: f64) -> RankingMetadata {
    RankingMetadata {
        label_to_model: [
            ("Response A".to_string(), "openai/gpt-4o".to_string()),
            ("Response B".to_string(), "anthropic/claude".to_string()),
        ]
        .into_iter()
        .collect(),
        aggregate_rankings: vec![AggregateRanking {
            model: "anthropic/claude".into(),
            average_rank,
            rankings_count: 1,
        }],
    }
}

fn stage3_data() -> Stage3Result {
    Stage3Result {
        model: "google/gemini".into(),
        response: "Synthesis".into(),
    }
}

/// App with `id` selected and loaded.
fn app_on(id: &str, messages: Vec<Message>) -> AppState {
    let mut app = AppState::default();
    let loaded = conversation(id, messages);
    app.conversations.list = vec![loaded.summary()];
    app.conversations.selected = Some(id.to_string());
    app.conversations.active = Some(loaded);
    app
}

fn command(app: &mut AppState, command: Command) -> Vec<UiEffect> {
    update(app, UiEvent::Command(command))
}

fn send(app: &mut AppState, text: &str) -> (TaskId, String) {
    let effects = command(
        app,
        Command::SendMessage {
            text: text.to_string(),
        },
    );
    match effects.as_slice() {
        [
            UiEffect::StartSession {
                task,
                conversation_id,
                ..
            },
        ] => (*task, conversation_id.clone()),
        other => panic!("expected StartSession, got {other:?}"),
    }
}

fn stream(app: &mut AppState, task: TaskId, id: &str, events: Vec<CouncilEvent>) {
    for event in events {
        update(
            app,
            UiEvent::Session(SessionUiEvent::Event {
                task,
                conversation_id: id.to_string(),
                event,
            }),
        );
    }
}

fn rerun_started(effects: &[UiEffect]) -> (TaskId, RerunTarget) {
    match effects {
        [UiEffect::RunRerun { task, target, .. }] => (*task, target.clone()),
        other => panic!("expected RunRerun, got {other:?}"),
    }
}

fn last_assistant(app: &AppState) -> &AssistantMessage {
    app.active_conversation()
        .and_then(Conversation::last_assistant)
        .expect("assistant message")
}

fn list_ids(app: &AppState) -> Vec<&str> {
    app.conversations
        .list
        .iter()
        .map(|summary| summary.id.as_str())
        .collect()
}

fn delete(app: &mut AppState, id: &str) {
    let effects = command(app, Command::DeleteConversation { id: id.into() });
    assert!(
        effects
            .iter()
            .any(|e| matches!(e, UiEffect::DeleteConversation { id: deleted } if deleted == id))
    );
}

fn delete_result(app: &mut AppState, id: &str, ok: bool) {
    let event = if ok {
        ConversationUiEvent::Deleted { id: id.into() }
    } else {
        ConversationUiEvent::DeleteFailed {
            id: id.into(),
            error: "HTTP 500".into(),
        }
    };
    update(app, UiEvent::Conversation(event));
}

// ----------------------------------------------------------------------------
// Session
// ----------------------------------------------------------------------------

#[test]
fn test_auto_run_builds_complete_message() {
    let mut app = app_on("c1", vec![]);
    app.execution_mode = ExecutionMode::Auto;
    let (task, id) = send(&mut app, "What is Rust?");

    stream(
        &mut app,
        task,
        &id,
        vec![
            CouncilEvent::Stage1Start,
            CouncilEvent::Stage1Complete {
                data: stage1_data(),
            },
            CouncilEvent::Stage2Start,
            CouncilEvent::Stage2Complete {
                data: stage2_data(),
                metadata: metadata(1.0),
            },
            CouncilEvent::Stage3Start,
            CouncilEvent::Stage3Complete {
                data: stage3_data(),
            },
            CouncilEvent::Complete,
        ],
    );

    let active = app.active_conversation().unwrap();
    assert!(active.is_alternating());
    assert_eq!(active.messages.len(), 2);
    let message = last_assistant(&app);
    assert!(message.stages_are_monotonic());
    assert_eq!(message.stage3, Some(stage3_data()));
    assert!(!message.loading.any());
    assert!(!app.send_busy());
    assert_eq!(app.conversations.list[0].message_count, 2);
}

#[test]
fn test_open_failure_restores_message_sequence() {
    let history = vec![Message::user("earlier"), Message::assistant()];
    let mut app = app_on("c1", history.clone());
    let (task, id) = send(&mut app, "second");
    assert_eq!(app.active_conversation().unwrap().messages.len(), 4);

    update(
        &mut app,
        UiEvent::Session(SessionUiEvent::OpenFailed {
            task,
            conversation_id: id,
            error: "HTTP 502".into(),
        }),
    );
    assert_eq!(app.active_conversation().unwrap().messages, history);
    assert_eq!(app.conversations.list[0].message_count, 2);
    assert!(!app.send_busy());
    assert!(app.status.as_ref().is_some_and(|s| s.is_error()));
}

#[test]
fn test_error_event_keeps_completed_stages() {
    let mut app = app_on("c1", vec![]);
    app.execution_mode = ExecutionMode::Auto;
    let (task, id) = send(&mut app, "q");

    stream(
        &mut app,
        task,
        &id,
        vec![
            CouncilEvent::Stage1Start,
            CouncilEvent::Stage1Complete {
                data: stage1_data(),
            },
            CouncilEvent::Stage2Start,
            CouncilEvent::Error {
                message: "ranking failed".into(),
            },
        ],
    );

    let message = last_assistant(&app);
    assert_eq!(message.stage1, Some(stage1_data()));
    assert!(message.stage2.is_none());
    assert!(!message.loading.any());
    assert!(!app.send_busy());
    let status = app.status.as_ref().unwrap();
    assert!(status.is_error());
    assert!(status.message.contains("ranking failed"));
}

#[test]
fn test_idle_timeout_keeps_completed_stages() {
    let mut app = app_on("c1", vec![]);
    app.execution_mode = ExecutionMode::Auto;
    let (task, id) = send(&mut app, "q");
    stream(
        &mut app,
        task,
        &id,
        vec![
            CouncilEvent::Stage1Start,
            CouncilEvent::Stage1Complete {
                data: stage1_data(),
            },
            CouncilEvent::Stage2Start,
        ],
    );

    update(
        &mut app,
        UiEvent::Session(SessionUiEvent::Aborted {
            task,
            conversation_id: id,
            error: "No pipeline event for 30s".into(),
        }),
    );

    assert_eq!(app.active_conversation().unwrap().messages.len(), 2);
    let message = last_assistant(&app);
    assert_eq!(message.stage1, Some(stage1_data()));
    assert!(!message.loading.any());
    assert!(!app.send_busy());
    assert_eq!(app.conversations.list[0].message_count, 2);
}

#[test]
fn test_title_refresh_keeps_active_summary_in_sync() {
    let mut app = app_on("c1", vec![]);
    let (task, id) = send(&mut app, "q");
    stream(&mut app, task, &id, vec![CouncilEvent::Stage1Start]);

    let effects = update(
        &mut app,
        UiEvent::Session(SessionUiEvent::Event {
            task,
            conversation_id: id.clone(),
            event: CouncilEvent::TitleComplete {
                title: Some("Rust".into()),
            },
        }),
    );
    let list_task = match effects.as_slice() {
        [UiEffect::LoadConversationList { task }] => *task,
        other => panic!("expected LoadConversationList, got {other:?}"),
    };
    stream(
        &mut app,
        task,
        &id,
        vec![CouncilEvent::Paused {
            stage: Stage::Stage1,
        }],
    );

    // backend listing taken before it stored the assistant message
    let mut listed = summary("c1");
    listed.title = Some("Rust".into());
    listed.message_count = 1;
    update(
        &mut app,
        UiEvent::Conversation(ConversationUiEvent::ListLoaded {
            task: list_task,
            conversations: vec![listed, summary("c2")],
        }),
    );

    assert_eq!(list_ids(&app), ["c1", "c2"]);
    assert_eq!(app.conversations.list[0].message_count, 2);
    assert_eq!(app.conversations.list[0].title.as_deref(), Some("Rust"));
    assert_eq!(app.conversations.list[1].message_count, 0);
}

#[test]
fn test_step_mode_pauses_then_continues_twice() {
    let mut app = app_on("c1", vec![]);
    let (task, id) = send(&mut app, "q");
    stream(
        &mut app,
        task,
        &id,
        vec![
            CouncilEvent::Stage1Start,
            CouncilEvent::Stage1Complete {
                data: stage1_data(),
            },
            CouncilEvent::Paused {
                stage: Stage::Stage1,
            },
        ],
    );
    assert_eq!(last_assistant(&app).paused, Some(Stage::Stage1));
    assert!(!app.send_busy());

    // first continue runs stage 2 and pauses again
    let (task, target) = rerun_started(&command(&mut app, Command::ContinueNextStage));
    assert!(app.busy().continue_busy);
    assert_eq!(target.message_index, 1);
    update(
        &mut app,
        UiEvent::Rerun(RerunUiEvent::Finished {
            task,
            target,
            outcome: RerunOutcome::Continued(ContinueOutcome::Stage2 {
                data: stage2_data(),
                metadata: metadata(1.0),
            }),
        }),
    );
    let message = last_assistant(&app);
    assert_eq!(message.paused, Some(Stage::Stage2));
    assert_eq!(message.metadata, Some(metadata(1.0)));

    // second continue finishes the pipeline
    let (task, target) = rerun_started(&command(&mut app, Command::ContinueNextStage));
    update(
        &mut app,
        UiEvent::Rerun(RerunUiEvent::Finished {
            task,
            target,
            outcome: RerunOutcome::Continued(ContinueOutcome::Stage3 {
                data: stage3_data(),
            }),
        }),
    );
    let message = last_assistant(&app);
    assert_eq!(message.stage3, Some(stage3_data()));
    assert_eq!(message.paused, None);
    assert!(message.stages_are_monotonic());
    assert!(!app.busy().continue_busy);

    // nothing left to continue
    assert!(command(&mut app, Command::ContinueNextStage).is_empty());
}

#[test]
fn test_out_of_order_completion_never_breaks_monotonicity() {
    let mut app = app_on("c1", vec![]);
    let (task, id) = send(&mut app, "q");
    stream(
        &mut app,
        task,
        &id,
        vec![
            CouncilEvent::Stage2Complete {
                data: stage2_data(),
                metadata: metadata(1.0),
            },
            CouncilEvent::Stage3Complete {
                data: stage3_data(),
            },
        ],
    );
    let message = last_assistant(&app);
    assert!(message.stages_are_monotonic());
    assert!(message.stage2.is_none());
    assert!(message.stage3.is_none());
}

#[test]
fn test_rerun_is_rejected_while_streaming() {
    let mut app = app_on(
        "c1",
        vec![
            Message::user("q"),
            Message::Assistant(AssistantMessage {
                stage1: Some(stage1_data()),
                ..Default::default()
            }),
        ],
    );
    send(&mut app, "follow-up");
    assert!(
        command(
            &mut app,
            Command::RerunStage1Model {
                model: "openai/gpt-4o".into()
            }
        )
        .is_empty()
    );
    assert!(!app.rerun.is_busy());
}

// ----------------------------------------------------------------------------
// Rerun
// ----------------------------------------------------------------------------

#[test]
fn test_stage2_rerun_replaces_rankings_and_metadata_together() {
    let mut app = app_on(
        "c1",
        vec![
            Message::user("q"),
            Message::Assistant(AssistantMessage {
                stage1: Some(stage1_data()),
                stage2: Some(stage2_data()),
                metadata: Some(metadata(1.0)),
                stage3: Some(stage3_data()),
                ..Default::default()
            }),
        ],
    );
    let (task, target) = rerun_started(&command(
        &mut app,
        Command::RerunStage2Model {
            model: "openai/gpt-4o".into(),
        },
    ));
    assert_eq!(
        app.busy().rerun_stage2_model.as_deref(),
        Some("openai/gpt-4o")
    );
    // nothing changes while the request is in flight
    assert_eq!(last_assistant(&app).metadata, Some(metadata(1.0)));

    let mut reranked = stage2_data();
    reranked[0].parsed_ranking.reverse();
    update(
        &mut app,
        UiEvent::Rerun(RerunUiEvent::Finished {
            task,
            target,
            outcome: RerunOutcome::Stage2(Stage2Rerun {
                stage2: reranked.clone(),
                metadata: metadata(2.0),
            }),
        }),
    );
    let message = last_assistant(&app);
    assert_eq!(message.stage2, Some(reranked));
    assert_eq!(message.metadata, Some(metadata(2.0)));
    assert_eq!(message.stage3, Some(stage3_data()));
    assert_eq!(app.busy().rerun_stage2_model, None);
}

// ----------------------------------------------------------------------------
// Conversation list
// ----------------------------------------------------------------------------

#[test]
fn test_delete_removes_immediately_and_confirms() {
    let mut app = AppState::default();
    app.conversations.list = vec![summary("a"), summary("b")];
    delete(&mut app, "a");
    assert_eq!(list_ids(&app), vec!["b"]);
    assert!(app.conversations.is_delete_pending("a"));

    delete_result(&mut app, "a", true);
    assert_eq!(list_ids(&app), vec!["b"]);
    assert!(app.conversations.pending_deletes.is_empty());
}

#[test]
fn test_failed_delete_restores_exact_snapshot() {
    let mut app = AppState::default();
    app.conversations.list = vec![summary("a"), summary("b"), summary("c")];
    app.conversations.selected = Some("b".into());
    app.conversations.active = Some(conversation("b", vec![]));
    delete(&mut app, "b");
    assert!(app.conversations.selected.is_none());

    delete_result(&mut app, "b", false);
    assert_eq!(list_ids(&app), vec!["a", "b", "c"]);
    // selection is not restored
    assert!(app.conversations.selected.is_none());
    assert!(app.status.as_ref().is_some_and(|s| s.is_error()));
}

#[test]
fn test_concurrent_deletes_both_succeed_in_either_order() {
    for first in ["a", "b"] {
        let mut app = AppState::default();
        app.conversations.list = vec![summary("a"), summary("b")];
        delete(&mut app, "a");
        delete(&mut app, "b");
        assert!(app.conversations.list.is_empty());

        let second = if first == "a" { "b" } else { "a" };
        delete_result(&mut app, first, true);
        delete_result(&mut app, second, true);
        assert!(app.conversations.list.is_empty(), "order {first} first");
        assert!(app.conversations.pending_deletes.is_empty());
    }
}

#[test]
fn test_concurrent_deletes_second_fails_restores_its_snapshot() {
    let mut app = AppState::default();
    app.conversations.list = vec![summary("a"), summary("b")];
    delete(&mut app, "a");
    delete(&mut app, "b");

    delete_result(&mut app, "a", true);
    delete_result(&mut app, "b", false);
    // b's snapshot was taken after a had already been removed
    assert_eq!(list_ids(&app), vec!["b"]);
}

#[test]
fn test_concurrent_deletes_first_fails_after_second_succeeded() {
    let mut app = AppState::default();
    app.conversations.list = vec![summary("a"), summary("b")];
    delete(&mut app, "a");
    delete(&mut app, "b");

    delete_result(&mut app, "b", true);
    delete_result(&mut app, "a", false);
    // a's snapshot is restored verbatim, including the deleted b
    assert_eq!(list_ids(&app), vec!["a", "b"]);
}

#[test]
fn test_delete_of_streaming_conversation_cancels_session() {
    let mut app = app_on("c1", vec![]);
    let (task, id) = send(&mut app, "q");
    let effects = command(&mut app, Command::DeleteConversation { id: id.clone() });
    assert!(effects.iter().any(|e| matches!(
        e,
        UiEffect::CancelTask {
            token: Some(_),
            ..
        }
    )));
    assert!(!app.send_busy());

    // late events from the cancelled stream are dropped
    stream(&mut app, task, &id, vec![CouncilEvent::Stage1Start]);
    assert!(app.active_conversation().is_none());
}

// ----------------------------------------------------------------------------
// Restart
// ----------------------------------------------------------------------------

#[test]
fn test_edit_and_restart_replays_in_new_conversation() {
    let source_messages = vec![Message::user("old prompt"), Message::assistant()];
    let mut app = app_on("src", source_messages.clone());
    app.execution_mode = ExecutionMode::Auto;

    let effects = command(
        &mut app,
        Command::EditLastPromptAndRestart {
            text: "new prompt".into(),
        },
    );
    let [UiEffect::CreateConversation { task, purpose }] = effects.as_slice() else {
        panic!("expected CreateConversation, got {effects:?}");
    };
    assert!(app.busy().restart_busy);
    // sending is blocked for the whole restart
    assert!(
        command(
            &mut app,
            Command::SendMessage {
                text: "other".into()
            }
        )
        .is_empty()
    );

    let effects = update(
        &mut app,
        UiEvent::Conversation(ConversationUiEvent::Created {
            task: *task,
            purpose: purpose.clone(),
            conversation: conversation("new", vec![]),
        }),
    );
    let [
        UiEffect::SettleRestart {
            conversation_id,
            prompt,
            mode,
            ..
        },
    ] = effects.as_slice()
    else {
        panic!("expected SettleRestart, got {effects:?}");
    };
    assert_eq!(*mode, ExecutionMode::Auto);

    let effects = update(
        &mut app,
        UiEvent::Restart(RestartUiEvent::Settled {
            conversation_id: conversation_id.clone(),
            prompt: prompt.clone(),
            mode: *mode,
        }),
    );
    let [
        UiEffect::StartSession {
            task,
            conversation_id,
            content,
            mode,
            ..
        },
    ] = effects.as_slice()
    else {
        panic!("expected StartSession, got {effects:?}");
    };
    assert_eq!(conversation_id, "new");
    assert_eq!(content, "new prompt");
    assert_eq!(*mode, ExecutionMode::Auto);
    assert!(app.busy().restart_busy);

    stream(
        &mut app,
        *task,
        "new",
        vec![CouncilEvent::Stage1Start, CouncilEvent::Complete],
    );
    assert!(!app.busy().restart_busy);
    assert!(!app.send_busy());
    assert_eq!(list_ids(&app), vec!["new", "src"]);
    assert_eq!(app.active_conversation().unwrap().messages.len(), 2);
    assert_eq!(app.conversations.list[1].message_count, source_messages.len());
}

#[test]
fn test_restart_is_rejected_while_streaming() {
    let mut app = app_on("c1", vec![Message::user("q"), Message::assistant()]);
    send(&mut app, "follow-up");
    assert!(
        command(
            &mut app,
            Command::EditLastPromptAndRestart {
                text: "edited".into()
            }
        )
        .is_empty()
    );
    assert!(!app.restart.is_busy());
    assert_eq!(app.conversations.selected.as_deref(), Some("c1"));
}

#[test]
fn test_execution_mode_applies_to_next_send() {
    let mut app = app_on("c1", vec![]);
    command(
        &mut app,
        Command::SetExecutionMode {
            mode: ExecutionMode::Auto,
        },
    );
    let effects = command(&mut app, Command::SendMessage { text: "q".into() });
    assert!(matches!(
        effects.as_slice(),
        [UiEffect::StartSession {
            mode: ExecutionMode::Auto,
            ..
        }]
    ));
}
