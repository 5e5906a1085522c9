//! MarginEdge restaurant-operations toolkit.
//!
//! `marginedge` pulls purchasing data (restaurant units, categories,
//! products, vendors, orders) from the MarginEdge public REST API, keeps it
//! in a local JSON snapshot, and answers purchasing questions over it, either
//! directly or through LLM function calling.
//!
//! ```ignore
//! use marginedge::prelude::*;
//!
//! let client = MarginEdgeClient::new(ClientConfig::new(api_key))?;
//! let snapshot = client
//!     .fetch_snapshot(&unit_id, &SnapshotOptions::default(), today)
//!     .await?;
//! snapshot.save("restaurant_data.json")?;
//!
//! let dataset = Dataset::from_snapshot(&snapshot);
//! let top = analytics::top_vendors_by_spend(&dataset, 5);
//! ```
//!
//! # Where to find things
//!
//! - **Talk to the API:** [`MarginEdgeClient`](api::MarginEdgeClient). Every
//!   list resource is fetched across all pages, retried on HTTP 429 with
//!   doubling backoff, and cached per instance.
//! - **Save and load data:** [`Snapshot`](snapshot::Snapshot), plus
//!   [`browse`] for an interactive walk through a snapshot file.
//! - **Answer questions:** pure helpers in [`analytics`] over a
//!   [`Dataset`](analytics::Dataset); client-backed variants in [`live`].
//! - **LLM function calling:** [`tools`] exports every analytics question as
//!   a typed, schema-validated tool; [`chat`] talks to an OpenAI-compatible
//!   endpoint; [`assistant`] runs the one-tool-per-turn conversation.

pub mod analytics;
pub mod api;
pub mod assistant;
pub mod browse;
pub mod chat;
pub mod config;
pub mod live;
pub mod model;
pub mod prelude;
pub mod snapshot;
pub mod tools;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Re-export schemars for downstream crates.
pub use schemars;

// ── Schema generation ──────────────────────────────────────────────

/// Generate a JSON Schema `serde_json::Value` from a type that implements
/// `schemars::JsonSchema`. Tool parameter schemas are produced this way so
/// the schema and the argument struct cannot drift apart.
///
/// ```
/// use marginedge::json_schema_for;
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct SearchArgs {
///     query: String,
///     #[serde(default)]
///     days: Option<i64>,
/// }
///
/// let schema = json_schema_for::<SearchArgs>();
/// assert_eq!(schema["type"], "object");
/// assert!(schema["required"].as_array().unwrap().contains(&"query".into()));
/// ```
pub fn json_schema_for<T: JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema)
        .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}))
}

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::Tool => write!(f, "tool"),
        }
    }
}

/// A message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn with_role(role: MessageRole, content: Option<String>) -> Self {
        Self {
            role,
            content,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, Some(content.into()))
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, Some(content.into()))
    }

    pub fn assistant_text(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, Some(content.into()))
    }

    pub fn assistant_tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: Some(calls),
            ..Self::with_role(MessageRole::Assistant, None)
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            ..Self::with_role(MessageRole::Tool, Some(content.into()))
        }
    }
}

// ── Tool types ─────────────────────────────────────────────────────

/// The type of a tool definition. Currently always `Function`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ToolType {
    #[serde(rename = "function")]
    Function,
}

/// Tool definition sent to the API (OpenAI function-calling format).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ToolDef {
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    pub function: FunctionDef,
}

impl ToolDef {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: ToolType::Function,
            function: FunctionDef {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// The type of a tool call. Currently always `Function`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum CallType {
    #[serde(rename = "function")]
    Function,
}

/// A tool call returned by the model.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: CallType,
    pub function: FunctionCallData,
}

impl ToolCall {
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            call_type: CallType::Function,
            function: FunctionCallData {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FunctionCallData {
    pub name: String,
    /// Raw JSON argument string, exactly as the model produced it.
    pub arguments: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors() {
        let sys = Message::system("hello");
        assert_eq!(sys.role, MessageRole::System);
        assert_eq!(sys.content.as_deref(), Some("hello"));

        let user = Message::user("world");
        assert_eq!(user.role, MessageRole::User);

        let calls = Message::assistant_tool_calls(vec![ToolCall::function("c1", "f", "{}")]);
        assert_eq!(calls.role, MessageRole::Assistant);
        assert!(calls.content.is_none());

        let tool = Message::tool_result("call-1", "result");
        assert_eq!(tool.role, MessageRole::Tool);
        assert_eq!(tool.tool_call_id.as_deref(), Some("call-1"));
    }

    #[test]
    fn tool_call_wire_format() {
        let call = ToolCall::function("call_1", "search_products", r#"{"query":"lime"}"#);
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], "search_products");

        let back: ToolCall = serde_json::from_value(json).unwrap();
        assert_eq!(back, call);
    }

    #[test]
    fn optional_message_fields_are_omitted() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("tool_calls").is_none());
        assert!(json.get("tool_call_id").is_none());
    }
}
