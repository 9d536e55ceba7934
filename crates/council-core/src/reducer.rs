//! Stage reducer.
//!
//! Applies one `CouncilEvent` to the in-flight assistant message. No I/O and
//! no buffering: events are assumed to arrive in stage order, start before
//! complete. The returned `StreamSignal` tells the caller what the event
//! means for the session as a whole (title refresh, end of stream).

use crate::conversation::{AssistantMessage, Stage};
use crate::events::CouncilEvent;

/// Session-level meaning of an applied event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSignal {
    /// Keep streaming.
    Continue,
    /// The conversation title was generated; refresh the summary list.
    TitleReady { title: Option<String> },
    /// Step mode paused after `stage`; the stream is over.
    Paused { stage: Stage },
    /// All stages finished; the stream is over.
    Complete,
    /// The backend reported a failure; the stream is over.
    Failed { message: String },
}

impl StreamSignal {
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            StreamSignal::Paused { .. } | StreamSignal::Complete | StreamSignal::Failed { .. }
        )
    }
}

/// Applies `event` to `message` in place.
pub fn apply_event(message: &mut AssistantMessage, event: &CouncilEvent) -> StreamSignal {
    match event {
        CouncilEvent::Stage1Start => {
            message.loading.stage1 = true;
            StreamSignal::Continue
        }
        CouncilEvent::Stage1Complete { data } => {
            message.stage1 = Some(data.clone());
            message.loading.stage1 = false;
            StreamSignal::Continue
        }
        CouncilEvent::Stage2Start => {
            message.loading.stage2 = true;
            StreamSignal::Continue
        }
        CouncilEvent::Stage2Complete { data, metadata } => {
            message.loading.stage2 = false;
            // Rankings without the responses they rank would break stage order.
            if message.stage1.is_none() {
                tracing::warn!("stage2_complete arrived before stage1_complete; ignored");
                return StreamSignal::Continue;
            }
            message.stage2 = Some(data.clone());
            message.metadata = Some(metadata.clone());
            StreamSignal::Continue
        }
        CouncilEvent::Stage3Start => {
            message.loading.stage3 = true;
            StreamSignal::Continue
        }
        CouncilEvent::Stage3Complete { data } => {
            message.loading.stage3 = false;
            if message.stage2.is_none() {
                tracing::warn!("stage3_complete arrived before stage2_complete; ignored");
                return StreamSignal::Continue;
            }
            message.stage3 = Some(data.clone());
            StreamSignal::Continue
        }
        CouncilEvent::Paused { stage } => {
            message.paused = Some(*stage);
            message.loading.clear();
            StreamSignal::Paused { stage: *stage }
        }
        CouncilEvent::TitleComplete { title } => StreamSignal::TitleReady {
            title: title.clone(),
        },
        CouncilEvent::Complete => StreamSignal::Complete,
        CouncilEvent::Error { message: text } => {
            // Stage data already merged stays; only the spinners stop.
            message.loading.clear();
            StreamSignal::Failed {
                message: text.clone(),
            }
        }
        CouncilEvent::Unknown { raw } => {
            tracing::warn!(raw = %raw, "ignoring unknown pipeline event");
            StreamSignal::Continue
        }
    }
}

/// Session-level meaning of `event` without touching any message.
///
/// Used when the conversation a stream belongs to is not the one on screen.
pub fn signal_of(event: &CouncilEvent) -> StreamSignal {
    match event {
        CouncilEvent::TitleComplete { title } => StreamSignal::TitleReady {
            title: title.clone(),
        },
        CouncilEvent::Paused { stage } => StreamSignal::Paused { stage: *stage },
        CouncilEvent::Complete => StreamSignal::Complete,
        CouncilEvent::Error { message } => StreamSignal::Failed {
            message: message.clone(),
        },
        _ => StreamSignal::Continue,
    }
}

/// Folds a sequence of events into a fresh assistant message.
///
/// Stops at the first event that ends the session.
pub fn replay<'a>(events: impl IntoIterator<Item = &'a CouncilEvent>) -> AssistantMessage {
    let mut message = AssistantMessage::default();
    for event in events {
        if apply_event(&mut message, event).ends_session() {
            break;
        }
    }
    message
}
