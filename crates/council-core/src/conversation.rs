//! Conversation data model.
//!
//! These types mirror the JSON the council backend stores and returns:
//! - `Conversation` - full conversation with its message sequence
//! - `ConversationSummary` - sidebar projection (id, title, count)
//! - `Message` - `User` / `Assistant`, tagged by `role`
//! - `AssistantMessage` - the three council stages plus transient UI flags
//!
//! ## Pause Modeling
//!
//! The backend stores a paused message as `paused: bool` plus
//! `pausedStage: "stage1" | "stage2" | "stage3" | null`. In memory that pair
//! collapses into `AssistantMessage::paused: Option<Stage>` so that
//! "paused without a stage" cannot be represented. The position of the
//! pipeline is derived from which stages are present (`StageCursor`).

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum length of a conversation title (after trimming).
pub const MAX_TITLE_LEN: usize = 50;

static TITLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\s\-_.]+$").expect("valid title pattern"));

// ============================================================================
// Stages and modes
// ============================================================================

/// One of the three council stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Stage1,
    Stage2,
    Stage3,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Stage1 => "stage1",
            Stage::Stage2 => "stage2",
            Stage::Stage3 => "stage3",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "stage1" => Ok(Stage::Stage1),
            "stage2" => Ok(Stage::Stage2),
            "stage3" => Ok(Stage::Stage3),
            _ => Err(format!("Unknown stage: {value}")),
        }
    }
}

/// How far the pipeline of one assistant message has progressed.
///
/// `StageN` means stage N is running or is the last completed stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StageCursor {
    NotStarted,
    Stage1,
    Stage2,
    Stage3,
    Done,
}

/// Execution mode of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Run all three stages without pausing.
    Auto,
    /// Pause after each stage until explicitly continued.
    #[default]
    Step,
}

impl ExecutionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionMode::Auto => "auto",
            ExecutionMode::Step => "step",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ExecutionMode::Auto),
            "step" => Ok(ExecutionMode::Step),
            other => Err(format!("Unknown execution mode: {other} (expected auto or step)")),
        }
    }
}

// ============================================================================
// Stage payloads
// ============================================================================

/// A single council member's stage-1 answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage1Response {
    pub model: String,
    pub response: String,
}

/// A single council member's stage-2 peer ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage2Ranking {
    pub model: String,
    pub ranking: String,
    /// Labels in ranked order, as extracted by the backend ("Response A", ...).
    #[serde(default)]
    pub parsed_ranking: Vec<String>,
}

/// The chairman's synthesized verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage3Result {
    pub model: String,
    pub response: String,
}

/// Cross-model combined ranking entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRanking {
    pub model: String,
    pub average_rank: f64,
    pub rankings_count: u32,
}

/// Stage-2 metadata: de-anonymization map plus aggregate rankings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankingMetadata {
    #[serde(default)]
    pub label_to_model: BTreeMap<String, String>,
    #[serde(default)]
    pub aggregate_rankings: Vec<AggregateRanking>,
}

/// Per-stage loading indicators (transient, never persisted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StageLoading {
    pub stage1: bool,
    pub stage2: bool,
    pub stage3: bool,
}

impl StageLoading {
    pub fn any(&self) -> bool {
        self.stage1 || self.stage2 || self.stage3
    }

    pub fn clear(&mut self) {
        *self = StageLoading::default();
    }
}

// ============================================================================
// Messages
// ============================================================================

/// The council's answer to one user prompt.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "AssistantWire", into = "AssistantWire")]
pub struct AssistantMessage {
    pub stage1: Option<Vec<Stage1Response>>,
    pub stage2: Option<Vec<Stage2Ranking>>,
    pub stage3: Option<Stage3Result>,
    pub metadata: Option<RankingMetadata>,
    pub loading: StageLoading,
    /// Stage after which a step-mode run is waiting for `continue`.
    pub paused: Option<Stage>,
}

impl AssistantMessage {
    /// Derives the pipeline position from stage presence and loading flags.
    pub fn cursor(&self) -> StageCursor {
        if self.stage3.is_some() {
            StageCursor::Done
        } else if self.stage2.is_some() || self.loading.stage3 {
            if self.loading.stage3 {
                StageCursor::Stage3
            } else {
                StageCursor::Stage2
            }
        } else if self.stage1.is_some() || self.loading.stage2 {
            if self.loading.stage2 {
                StageCursor::Stage2
            } else {
                StageCursor::Stage1
            }
        } else if self.loading.stage1 {
            StageCursor::Stage1
        } else {
            StageCursor::NotStarted
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.is_some()
    }

    /// Stage 2 requires stage 1, stage 3 requires stage 2.
    pub fn stages_are_monotonic(&self) -> bool {
        (self.stage2.is_none() || self.stage1.is_some())
            && (self.stage3.is_none() || self.stage2.is_some())
    }

    /// The stage `continue` would run next, if any.
    pub fn next_continuable_stage(&self) -> Option<Stage> {
        match (&self.stage1, &self.stage2, &self.stage3) {
            (Some(_), None, _) => Some(Stage::Stage2),
            (Some(_), Some(_), None) => Some(Stage::Stage3),
            _ => None,
        }
    }
}

/// Persisted shape of an assistant message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AssistantWire {
    #[serde(default)]
    stage1: Option<Vec<Stage1Response>>,
    #[serde(default)]
    stage2: Option<Vec<Stage2Ranking>>,
    #[serde(default)]
    stage3: Option<Stage3Result>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<RankingMetadata>,
    #[serde(default)]
    paused: bool,
    #[serde(default, rename = "pausedStage")]
    paused_stage: Option<Stage>,
}

impl From<AssistantWire> for AssistantMessage {
    fn from(wire: AssistantWire) -> Self {
        Self {
            stage1: wire.stage1,
            stage2: wire.stage2,
            stage3: wire.stage3,
            metadata: wire.metadata,
            loading: StageLoading::default(),
            // `paused: true` without a stage carries no usable position
            paused: if wire.paused { wire.paused_stage } else { None },
        }
    }
}

impl From<AssistantMessage> for AssistantWire {
    fn from(message: AssistantMessage) -> Self {
        Self {
            stage1: message.stage1,
            stage2: message.stage2,
            stage3: message.stage3,
            metadata: message.metadata,
            paused: message.paused.is_some(),
            paused_stage: message.paused,
        }
    }
}

/// A conversation message, tagged by `role` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    User { content: String },
    Assistant(AssistantMessage),
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    pub fn assistant() -> Self {
        Message::Assistant(AssistantMessage::default())
    }

    pub fn as_assistant(&self) -> Option<&AssistantMessage> {
        match self {
            Message::Assistant(message) => Some(message),
            Message::User { .. } => None,
        }
    }
}

// ============================================================================
// Conversations
// ============================================================================

/// A full conversation as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub council_models: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chairman_model: Option<String>,
}

impl Conversation {
    /// Index of the last message if it is the assistant message of the
    /// latest exchange.
    pub fn last_assistant_index(&self) -> Option<usize> {
        let index = self.messages.len().checked_sub(1)?;
        matches!(self.messages[index], Message::Assistant(_)).then_some(index)
    }

    pub fn last_assistant(&self) -> Option<&AssistantMessage> {
        self.messages.last().and_then(Message::as_assistant)
    }

    pub fn last_assistant_mut(&mut self) -> Option<&mut AssistantMessage> {
        match self.messages.last_mut() {
            Some(Message::Assistant(message)) => Some(message),
            _ => None,
        }
    }

    /// Prompt of the latest exchange (the user message right before the
    /// last assistant message).
    pub fn last_prompt(&self) -> Option<&str> {
        let index = self.last_assistant_index()?.checked_sub(1)?;
        match &self.messages[index] {
            Message::User { content } => Some(content),
            Message::Assistant(_) => None,
        }
    }

    /// Appends a user prompt and an empty assistant message.
    pub fn push_exchange(&mut self, prompt: impl Into<String>) {
        self.messages.push(Message::user(prompt));
        self.messages.push(Message::assistant());
    }

    /// Messages alternate User, Assistant, ... starting with User.
    pub fn is_alternating(&self) -> bool {
        self.messages.iter().enumerate().all(|(i, message)| {
            matches!(
                (i % 2, message),
                (0, Message::User { .. }) | (1, Message::Assistant(_))
            )
        })
    }

    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary::from(self)
    }
}

/// Sidebar projection of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message_count: usize,
}

impl ConversationSummary {
    /// Title for display, falling back to a placeholder.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("New Conversation")
    }

    /// Creation time in local display form, if the timestamp parses.
    ///
    /// The backend writes naive UTC ISO timestamps; RFC 3339 is accepted too.
    pub fn created_display(&self) -> Option<String> {
        parse_timestamp(&self.created_at).map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
    }
}

impl From<&Conversation> for ConversationSummary {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id.clone(),
            created_at: conversation.created_at.clone(),
            title: conversation.title.clone(),
            message_count: conversation.messages.len(),
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

// ============================================================================
// Validation helpers
// ============================================================================

/// Validates and trims a conversation title.
///
/// # Errors
/// Returns an error if the title is empty, too long, or contains characters
/// other than letters, digits, whitespace, `-`, `_` and `.`.
pub fn normalize_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > MAX_TITLE_LEN {
        bail!("Title must be 1-{MAX_TITLE_LEN} characters");
    }
    if !TITLE_PATTERN.is_match(trimmed) {
        bail!("Title may only contain letters, numbers, spaces and .-_");
    }
    Ok(trimmed.to_string())
}

/// Trims model ids, dropping empties and duplicates (first occurrence wins).
pub fn normalize_model_ids(models: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    models
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty() && seen.insert(m.to_string()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_assistant_wire_roundtrip_preserves_pause() {
        let raw = json!({
            "role": "assistant",
            "stage1": [{"model": "a/x", "response": "hi"}],
            "stage2": null,
            "stage3": null,
            "paused": true,
            "pausedStage": "stage1"
        });
        let message: Message = serde_json::from_value(raw).unwrap();
        let Message::Assistant(assistant) = &message else {
            panic!("expected assistant");
        };
        assert_eq!(assistant.paused, Some(Stage::Stage1));
        assert_eq!(assistant.cursor(), StageCursor::Stage1);

        let back = serde_json::to_value(&message).unwrap();
        assert_eq!(back["paused"], json!(true));
        assert_eq!(back["pausedStage"], json!("stage1"));
        assert!(back.get("loading").is_none());
    }

    #[test]
    fn test_paused_without_stage_is_not_paused() {
        let raw = json!({"role": "assistant", "paused": true});
        let message: Message = serde_json::from_value(raw).unwrap();
        assert_eq!(message.as_assistant().unwrap().paused, None);
    }

    #[test]
    fn test_user_message_deserializes() {
        let message: Message =
            serde_json::from_value(json!({"role": "user", "content": "question"})).unwrap();
        assert_eq!(message, Message::user("question"));
    }

    #[test]
    fn test_cursor_follows_stages() {
        let mut message = AssistantMessage::default();
        assert_eq!(message.cursor(), StageCursor::NotStarted);

        message.loading.stage1 = true;
        assert_eq!(message.cursor(), StageCursor::Stage1);

        message.loading.stage1 = false;
        message.stage1 = Some(vec![]);
        message.loading.stage2 = true;
        assert_eq!(message.cursor(), StageCursor::Stage2);

        message.loading.stage2 = false;
        message.stage2 = Some(vec![]);
        assert_eq!(message.cursor(), StageCursor::Stage2);

        message.loading.stage3 = true;
        assert_eq!(message.cursor(), StageCursor::Stage3);

        message.stage3 = Some(Stage3Result {
            model: "chair".into(),
            response: "done".into(),
        });
        assert_eq!(message.cursor(), StageCursor::Done);
    }

    #[test]
    fn test_next_continuable_stage() {
        let mut message = AssistantMessage::default();
        assert_eq!(message.next_continuable_stage(), None);
        message.stage1 = Some(vec![]);
        assert_eq!(message.next_continuable_stage(), Some(Stage::Stage2));
        message.stage2 = Some(vec![]);
        assert_eq!(message.next_continuable_stage(), Some(Stage::Stage3));
        message.stage3 = Some(Stage3Result {
            model: "m".into(),
            response: "r".into(),
        });
        assert_eq!(message.next_continuable_stage(), None);
    }

    #[test]
    fn test_last_prompt_and_alternation() {
        let mut conversation = Conversation {
            id: "c1".into(),
            created_at: String::new(),
            title: None,
            messages: vec![],
            council_models: None,
            chairman_model: None,
        };
        assert!(conversation.is_alternating());
        assert_eq!(conversation.last_prompt(), None);

        conversation.push_exchange("first");
        conversation.push_exchange("second");
        assert!(conversation.is_alternating());
        assert_eq!(conversation.last_assistant_index(), Some(3));
        assert_eq!(conversation.last_prompt(), Some("second"));

        conversation.messages.push(Message::user("dangling"));
        assert_eq!(conversation.last_assistant_index(), None);
        assert_eq!(conversation.last_prompt(), None);
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  My title.v2 ").unwrap(), "My title.v2");
        assert!(normalize_title("   ").is_err());
        assert!(normalize_title(&"x".repeat(51)).is_err());
        assert!(normalize_title("bad/title").is_err());
    }

    #[test]
    fn test_normalize_model_ids() {
        let models = vec![
            " openai/gpt ".to_string(),
            String::new(),
            "openai/gpt".to_string(),
            "x-ai/grok".to_string(),
        ];
        assert_eq!(
            normalize_model_ids(&models),
            vec!["openai/gpt".to_string(), "x-ai/grok".to_string()]
        );
    }

    #[test]
    fn test_summary_display() {
        let summary = ConversationSummary {
            id: "c1".into(),
            created_at: "2025-11-20T10:15:30.123456".into(),
            title: None,
            message_count: 0,
        };
        assert_eq!(summary.display_title(), "New Conversation");
        assert_eq!(summary.created_display().as_deref(), Some("2025-11-20 10:15"));
    }
}
