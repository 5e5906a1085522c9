//! Client for OpenAI-compatible chat completion endpoints.
//!
//! [`ChatBackend`] is the seam the assistant talks through; [`ChatClient`]
//! is the HTTP implementation (bearer auth, JSON body, 120 s timeout).

use crate::{Message, ToolCall, ToolDef};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

// ── Constants ──────────────────────────────────────────────────────

pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default model when none is configured.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

// ── Request types ──────────────────────────────────────────────────

/// Chat completion request body. Unused optional fields are omitted.
#[derive(Serialize, Debug, Default, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDef>>,
    /// `"auto"` lets the model choose between text and a tool call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
}

// ── Response types ─────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Clean return type of a chat call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatCompletion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<UsageInfo>,
    pub finish_reason: Option<String>,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Parse a successful response body into a [`ChatCompletion`].
///
/// A body with an `error` object is an error even under HTTP 200; a body
/// with no choices is an empty completion.
pub fn parse_chat_response(text: &str) -> Result<ChatCompletion, String> {
    let parsed: RawChatResponse =
        serde_json::from_str(text).map_err(|e| format!("failed to parse response: {e}"))?;

    if let Some(err) = parsed.error {
        return Err(format!("chat API error: {}", err.message));
    }

    if let Some(ref usage) = parsed.usage {
        debug!(
            "Token usage: prompt={}, completion={}, total={}",
            usage.prompt_tokens.unwrap_or(0),
            usage.completion_tokens.unwrap_or(0),
            usage.total_tokens.unwrap_or(0),
        );
    }

    Ok(match parsed.choices.and_then(|c| c.into_iter().next()) {
        Some(c) => ChatCompletion {
            content: c.message.content,
            tool_calls: c.message.tool_calls.unwrap_or_default(),
            usage: parsed.usage,
            finish_reason: c.finish_reason,
        },
        None => ChatCompletion {
            usage: parsed.usage,
            ..Default::default()
        },
    })
}

// ── Backend seam ───────────────────────────────────────────────────

/// Something that can answer a chat completion request.
pub trait ChatBackend: Send + Sync {
    fn chat<'a>(&'a self, body: &'a ChatRequest) -> BoxFuture<'a, Result<ChatCompletion, String>>;
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for an OpenAI-compatible chat completions endpoint.
pub struct ChatClient {
    client: reqwest::Client,
    api_key: String,
    url: String,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient").field("url", &self.url).finish()
    }
}

impl ChatClient {
    /// Client for the default OpenAI endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self, String> {
        Self::with_url(api_key, OPENAI_CHAT_URL)
    }

    /// Client for any OpenAI-compatible `/chat/completions` URL.
    pub fn with_url(api_key: impl Into<String>, url: impl Into<String>) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("marginedge/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a chat completion request.
    pub async fn send(&self, body: &ChatRequest) -> Result<ChatCompletion, String> {
        debug!(
            "LLM request: model={}, messages={}, tools={}",
            body.model,
            body.messages.len(),
            body.tools.as_ref().map_or(0, |t| t.len()),
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(format!("chat API HTTP {status}: {text}"));
        }

        let completion = parse_chat_response(&text)?;
        debug!(
            "LLM output: {} chars text, {} tool call(s)",
            completion.content.as_ref().map_or(0, |s| s.len()),
            completion.tool_calls.len()
        );
        Ok(completion)
    }
}

impl ChatBackend for ChatClient {
    fn chat<'a>(&'a self, body: &'a ChatRequest) -> BoxFuture<'a, Result<ChatCompletion, String>> {
        Box::pin(self.send(body))
    }
}
