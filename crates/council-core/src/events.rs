//! Pipeline event codec.
//!
//! The backend streams one JSON object per SSE frame, tagged by `type`.
//! `decode_event` turns a frame payload into a `CouncilEvent`:
//! - a known `type` with a well-formed payload decodes to its variant
//! - an unknown `type` decodes to `CouncilEvent::Unknown` (never an error)
//! - a frame that is not an object with a string `type`, or a known `type`
//!   whose payload does not match, is a `CodecError`

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::conversation::{
    RankingMetadata, Stage, Stage1Response, Stage2Ranking, Stage3Result,
};

/// Event types this client understands.
const KNOWN_TYPES: &[&str] = &[
    "stage1_start",
    "stage1_complete",
    "stage2_start",
    "stage2_complete",
    "stage3_start",
    "stage3_complete",
    "title_complete",
    "paused",
    "complete",
    "error",
];

/// A decoded pipeline event.
#[derive(Debug, Clone, PartialEq)]
pub enum CouncilEvent {
    Stage1Start,
    Stage1Complete {
        data: Vec<Stage1Response>,
    },
    Stage2Start,
    Stage2Complete {
        data: Vec<Stage2Ranking>,
        metadata: RankingMetadata,
    },
    Stage3Start,
    Stage3Complete {
        data: Stage3Result,
    },
    /// Title generation finished (title may be absent on older backends).
    TitleComplete {
        title: Option<String>,
    },
    /// Step mode stopped after `stage`.
    Paused {
        stage: Stage,
    },
    Complete,
    Error {
        message: String,
    },
    /// Unrecognized event type; carries the raw frame for logging.
    Unknown {
        raw: String,
    },
}

impl CouncilEvent {
    /// Wire name of the event (for logging).
    pub fn name(&self) -> &'static str {
        match self {
            CouncilEvent::Stage1Start => "stage1_start",
            CouncilEvent::Stage1Complete { .. } => "stage1_complete",
            CouncilEvent::Stage2Start => "stage2_start",
            CouncilEvent::Stage2Complete { .. } => "stage2_complete",
            CouncilEvent::Stage3Start => "stage3_start",
            CouncilEvent::Stage3Complete { .. } => "stage3_complete",
            CouncilEvent::TitleComplete { .. } => "title_complete",
            CouncilEvent::Paused { .. } => "paused",
            CouncilEvent::Complete => "complete",
            CouncilEvent::Error { .. } => "error",
            CouncilEvent::Unknown { .. } => "unknown",
        }
    }

    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CouncilEvent::Paused { .. } | CouncilEvent::Complete | CouncilEvent::Error { .. }
        )
    }
}

/// A frame that could not be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecError {
    pub message: String,
    /// The offending frame payload.
    pub raw: String,
}

impl CodecError {
    fn new(message: impl Into<String>, raw: &str) -> Self {
        Self {
            message: message.into(),
            raw: raw.to_string(),
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CodecError {}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireEvent {
    Stage1Start,
    Stage1Complete {
        data: Vec<Stage1Response>,
    },
    Stage2Start,
    Stage2Complete {
        data: Vec<Stage2Ranking>,
        #[serde(default)]
        metadata: RankingMetadata,
    },
    Stage3Start,
    Stage3Complete {
        data: Stage3Result,
    },
    TitleComplete {
        #[serde(default)]
        data: Option<TitleData>,
    },
    Paused {
        stage: Stage,
    },
    Complete,
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

#[derive(Deserialize)]
struct TitleData {
    #[serde(default)]
    title: Option<String>,
}

impl From<WireEvent> for CouncilEvent {
    fn from(wire: WireEvent) -> Self {
        match wire {
            WireEvent::Stage1Start => CouncilEvent::Stage1Start,
            WireEvent::Stage1Complete { data } => CouncilEvent::Stage1Complete { data },
            WireEvent::Stage2Start => CouncilEvent::Stage2Start,
            WireEvent::Stage2Complete { data, metadata } => {
                CouncilEvent::Stage2Complete { data, metadata }
            }
            WireEvent::Stage3Start => CouncilEvent::Stage3Start,
            WireEvent::Stage3Complete { data } => CouncilEvent::Stage3Complete { data },
            WireEvent::TitleComplete { data } => CouncilEvent::TitleComplete {
                title: data.and_then(|d| d.title),
            },
            WireEvent::Paused { stage } => CouncilEvent::Paused { stage },
            WireEvent::Complete => CouncilEvent::Complete,
            WireEvent::Error { message } => CouncilEvent::Error {
                message: message.unwrap_or_else(|| "Unknown error".to_string()),
            },
        }
    }
}

/// Decodes one frame payload.
///
/// # Errors
/// Returns a `CodecError` if the payload is not a JSON object with a string
/// `type`, or if a known event type carries a malformed payload.
pub fn decode_event(data: &str) -> Result<CouncilEvent, CodecError> {
    let value: Value = serde_json::from_str(data)
        .map_err(|err| CodecError::new(format!("Invalid event JSON: {err}"), data))?;

    let Some(kind) = value.get("type").and_then(Value::as_str) else {
        return Err(CodecError::new("Event is missing a string `type`", data));
    };

    if !KNOWN_TYPES.contains(&kind) {
        return Ok(CouncilEvent::Unknown {
            raw: data.to_string(),
        });
    }

    let kind = kind.to_string();
    serde_json::from_value::<WireEvent>(value)
        .map(CouncilEvent::from)
        .map_err(|err| CodecError::new(format!("Failed to parse {kind}: {err}"), data))
}
