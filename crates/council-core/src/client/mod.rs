//! HTTP transport for the council backend.
//!
//! Unary calls return decoded JSON payloads; `send_message_stream` opens the
//! SSE exchange and yields `CouncilEvent`s in delivery order.
//!
//! Every failure is an `anyhow::Error` wrapping a `BackendError`, so callers
//! can either display the chain or downcast for the category.

mod error;
mod sse;

use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::stream::BoxStream;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

pub use self::error::{BackendError, BackendErrorKind, BackendResult};
pub use self::sse::CouncilEventStream;
use self::error::classify_reqwest_error;
use crate::config::Config;
use crate::conversation::{
    Conversation, ConversationSummary, ExecutionMode, RankingMetadata, Stage1Response,
    Stage2Ranking, Stage3Result,
};
use crate::events::CouncilEvent;

/// Standard User-Agent header for council API requests.
pub const USER_AGENT: &str = concat!("council/", env!("CARGO_PKG_VERSION"));

/// Ordered stream of pipeline events for one `send`.
pub type EventStream = BoxStream<'static, BackendResult<CouncilEvent>>;

// ============================================================================
// Response payloads
// ============================================================================

/// Result of a stage-2 rerun: rankings and the metadata recomputed for them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Stage2Rerun {
    pub stage2: Vec<Stage2Ranking>,
    #[serde(default)]
    pub metadata: RankingMetadata,
}

/// Result of a `continue` call, tagged by the stage that ran.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "stage", rename_all = "lowercase")]
pub enum ContinueOutcome {
    Stage2 {
        data: Vec<Stage2Ranking>,
        #[serde(default)]
        metadata: RankingMetadata,
    },
    Stage3 {
        data: Stage3Result,
    },
    /// Nothing left to run.
    Complete,
}

/// Council configuration of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CouncilConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub council_models: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chairman_model: Option<String>,
}

/// Entry of the model catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub context_length: Option<u64>,
}

/// Model catalog as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ModelCatalog {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
    /// Whether the backend served the list from its cache.
    #[serde(default)]
    pub cached: bool,
}

#[derive(Deserialize)]
struct Stage1Envelope {
    stage1: Vec<Stage1Response>,
}

#[derive(Deserialize)]
struct Stage3Envelope {
    stage3: Stage3Result,
}

#[derive(Deserialize)]
struct TitleEnvelope {
    title: String,
}

#[derive(Deserialize)]
struct ConfigEnvelope {
    config: CouncilConfig,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    content: &'a str,
    mode: ExecutionMode,
}

#[derive(Serialize)]
struct RenameRequest<'a> {
    conversation_id: &'a str,
    title: &'a str,
}

// ============================================================================
// Client
// ============================================================================

/// Council backend client.
#[derive(Debug, Clone)]
pub struct CouncilClient {
    base_url: Url,
    request_timeout: Duration,
    stream_idle_timeout: Option<Duration>,
    http: reqwest::Client,
}

impl CouncilClient {
    /// Creates a client from config.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid backend base URL: {}", config.base_url))?;
        // No client-wide timeout: it would also cut off long event streams.
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(config.request_timeout())
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            request_timeout: config.request_timeout(),
            stream_idle_timeout: config.stream_idle_timeout(),
            http,
        })
    }

    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        let url = self.endpoint(&["api", "conversations"])?;
        self.send_json(self.unary(Method::GET, url)).await
    }

    pub async fn create_conversation(&self) -> Result<Conversation> {
        let url = self.endpoint(&["api", "conversations"])?;
        let request = self
            .unary(Method::POST, url)
            .json(&serde_json::Map::new());
        self.send_json(request).await
    }

    pub async fn get_conversation(&self, id: &str) -> Result<Conversation> {
        let url = self.endpoint(&["api", "conversations", id])?;
        self.send_json(self.unary(Method::GET, url)).await
    }

    pub async fn delete_conversation(&self, id: &str) -> Result<()> {
        let url = self.endpoint(&["api", "conversations", id])?;
        self.send(self.unary(Method::DELETE, url)).await?;
        Ok(())
    }

    /// Renames a conversation; returns the title the backend stored.
    pub async fn rename_conversation(&self, id: &str, title: &str) -> Result<String> {
        let url = self.endpoint(&["api", "conversations", id, "title"])?;
        let request = self.unary(Method::PATCH, url).json(&RenameRequest {
            conversation_id: id,
            title,
        });
        let envelope: TitleEnvelope = self.send_json(request).await?;
        Ok(envelope.title)
    }

    /// Updates the council configuration; returns the stored configuration.
    pub async fn update_council_config(
        &self,
        id: &str,
        update: &CouncilConfig,
    ) -> Result<CouncilConfig> {
        let url = self.endpoint(&["api", "conversations", id, "config"])?;
        let request = self.unary(Method::PATCH, url).json(update);
        let envelope: ConfigEnvelope = self.send_json(request).await?;
        Ok(envelope.config)
    }

    pub async fn list_models(&self) -> Result<ModelCatalog> {
        let url = self.endpoint(&["api", "models"])?;
        self.send_json(self.unary(Method::GET, url)).await
    }

    /// Opens the streamed pipeline exchange for a new prompt.
    ///
    /// Fails only if the exchange could not be opened (connection error or
    /// non-success status). Failures after that arrive as stream items.
    pub async fn send_message_stream(
        &self,
        id: &str,
        content: &str,
        mode: ExecutionMode,
    ) -> Result<EventStream> {
        let url = self.endpoint(&["api", "conversations", id, "message", "stream"])?;
        let request = self
            .http
            .post(url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&SendRequest { content, mode });

        tracing::debug!(conversation = id, %mode, "opening pipeline stream");
        let response = self.send(request).await?;
        let events = CouncilEventStream::new(response.bytes_stream());

        Ok(match self.stream_idle_timeout {
            Some(idle) => Box::pin(with_idle_timeout(events, idle)),
            None => Box::pin(events),
        })
    }

    pub async fn continue_stage(&self, id: &str, message_index: usize) -> Result<ContinueOutcome> {
        let index = message_index.to_string();
        let url = self.endpoint(&[
            "api",
            "conversations",
            id,
            "messages",
            index.as_str(),
            "continue",
        ])?;
        self.send_json(self.unary(Method::POST, url)).await
    }

    /// Reruns stage 1 for one model; returns the full stage-1 sequence.
    pub async fn rerun_stage1_model(
        &self,
        id: &str,
        message_index: usize,
        model: &str,
    ) -> Result<Vec<Stage1Response>> {
        let url = self.model_endpoint(id, message_index, "stage1", model)?;
        let envelope: Stage1Envelope = self.send_json(self.unary(Method::POST, url)).await?;
        Ok(envelope.stage1)
    }

    /// Reruns stage 2 for one model; returns rankings with fresh metadata.
    pub async fn rerun_stage2_model(
        &self,
        id: &str,
        message_index: usize,
        model: &str,
    ) -> Result<Stage2Rerun> {
        let url = self.model_endpoint(id, message_index, "stage2", model)?;
        self.send_json(self.unary(Method::POST, url)).await
    }

    pub async fn rerun_stage3(&self, id: &str, message_index: usize) -> Result<Stage3Result> {
        let index = message_index.to_string();
        let url = self.endpoint(&["api", "conversations", id, "messages", index.as_str(), "stage3"])?;
        let envelope: Stage3Envelope = self.send_json(self.unary(Method::POST, url)).await?;
        Ok(envelope.stage3)
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("Backend URL cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Model ids like `openai/gpt-4o` stay multi-segment paths.
    fn model_endpoint(
        &self,
        id: &str,
        message_index: usize,
        stage: &str,
        model: &str,
    ) -> Result<Url> {
        let index = message_index.to_string();
        let mut segments = vec![
            "api",
            "conversations",
            id,
            "messages",
            index.as_str(),
            stage,
            "model",
        ];
        segments.extend(model.split('/'));
        self.endpoint(&segments)
    }

    fn unary(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .timeout(self.request_timeout)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::http_status(status.as_u16(), &body).into());
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        serde_json::from_slice(&body).map_err(|err| {
            anyhow::Error::from(BackendError {
                kind: BackendErrorKind::Parse,
                message: format!("Failed to parse response: {err}"),
                details: Some(String::from_utf8_lossy(&body).into_owned()),
            })
        })
    }
}

/// Ends the stream with a timeout error when no event arrives for `idle`.
fn with_idle_timeout<S>(
    events: S,
    idle: Duration,
) -> impl futures_util::Stream<Item = BackendResult<CouncilEvent>> + Send + 'static
where
    S: futures_util::Stream<Item = BackendResult<CouncilEvent>> + Send + Unpin + 'static,
{
    futures_util::stream::unfold(Some(events), move |state| async move {
        let mut events = state?;
        match tokio::time::timeout(idle, futures_util::StreamExt::next(&mut events)).await {
            Ok(Some(item)) => Some((item, Some(events))),
            Ok(None) => None,
            Err(_) => Some((
                Err(BackendError::timeout(format!(
                    "No pipeline event for {idle:?}"
                ))),
                None,
            )),
        }
    })
}
