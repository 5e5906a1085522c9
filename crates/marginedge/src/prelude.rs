//! Convenience re-exports for common `marginedge` types.
//!
//! ```ignore
//! use marginedge::prelude::*;
//! ```
//!
//! Covers the client and its config, snapshots, the analytics dataset, the
//! tool registry, and the assistant. Transport seams and retry internals are
//! left out; import those from [`crate::api`] when writing fakes.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{Message, ToolCall, ToolDef, json_schema_for};

// ── API client ──────────────────────────────────────────────────────
pub use crate::api::{ApiError, ClientConfig, MarginEdgeClient, Resource, RetryPolicy};
pub use crate::config::{ConfigError, MarginEdgeEnv};

// ── Data ────────────────────────────────────────────────────────────
pub use crate::analytics::{self, Dataset, Lookup};
pub use crate::live::LiveAnalytics;
pub use crate::snapshot::{DEFAULT_SNAPSHOT_FILE, Snapshot, SnapshotError, SnapshotOptions};

// ── Tools and chat ──────────────────────────────────────────────────
pub use crate::assistant::{Assistant, AssistantConfig};
pub use crate::chat::{ChatBackend, ChatClient, ChatRequest, DEFAULT_CHAT_MODEL};
pub use crate::tools::{Tool, ToolFuture, ToolSet, ToolSpec, parse_tool_args};
