//! Tool abstraction for LLM function calling.
//!
//! The [`Tool`] trait defines the interface every tool implements: a static
//! API definition (name, description, JSON schema) and an async `execute`
//! method. Tools are collected into a [`ToolSet`] which handles dispatch,
//! argument validation, definition export, and result truncation.

use crate::ToolDef;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, info, trace};

/// Maximum size (in bytes) for tool output before truncation.
pub const DEFAULT_MAX_RESULT_BYTES: usize = 30_000;

/// Boxed future returned by [`Tool::execute`].
pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = String> + Send + 'a>>;

// ── Tool trait ─────────────────────────────────────────────────────

/// A tool that the model can invoke via function calling.
pub trait Tool: Send + Sync {
    /// The tool definition sent to the chat API.
    fn definition(&self) -> ToolDef;

    /// Execute the tool with the raw JSON arguments string.
    ///
    /// Errors are returned as `"Error: ..."` strings rather than panicking;
    /// the string goes back to the model as the tool result either way.
    fn execute(&self, arguments: &str) -> ToolFuture<'_>;

    /// The tool's name (delegates to the definition).
    fn name(&self) -> String {
        self.definition().function.name.clone()
    }
}

// ── ToolSet ────────────────────────────────────────────────────────

/// A collection of tools dispatched by name.
///
/// ```ignore
/// let tools = ToolSet::new()
///     .with_arg_validation(true)
///     .with_analytics_tools(Arc::new(dataset), today);
///
/// let defs = tools.definitions();
/// let result = tools.execute("search_products", r#"{"product_name":"lime"}"#).await;
/// ```
pub struct ToolSet {
    tools: HashMap<String, Box<dyn Tool>>,
    max_result_bytes: usize,
    /// Whether to validate tool arguments against JSON Schema before execution.
    validate_args: bool,
}

impl fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSet")
            .field("tools", &self.names())
            .field("max_result_bytes", &self.max_result_bytes)
            .field("validate_args", &self.validate_args)
            .finish()
    }
}

impl ToolSet {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            max_result_bytes: DEFAULT_MAX_RESULT_BYTES,
            validate_args: false,
        }
    }

    /// Set the maximum result size in bytes before truncation.
    pub fn with_max_result_bytes(mut self, max: usize) -> Self {
        self.max_result_bytes = max;
        self
    }

    /// Enable JSON Schema argument validation before tool execution.
    pub fn with_arg_validation(mut self, enabled: bool) -> Self {
        self.validate_args = enabled;
        self
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.tools.insert(tool.name(), Box::new(tool));
    }

    /// Register a tool (builder pattern).
    pub fn with(mut self, tool: impl Tool + 'static) -> Self {
        self.register(tool);
        self
    }

    /// All tool definitions, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDef> {
        let mut defs: Vec<ToolDef> = self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.function.name.cmp(&b.function.name));
        defs
    }

    /// Registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool call by name, with optional validation and truncation.
    ///
    /// An unknown name or invalid arguments produce an `"Error: ..."` string
    /// for the model to read; nothing here fails the conversation.
    pub async fn execute(&self, name: &str, arguments: &str) -> String {
        let Some(tool) = self.tools.get(name) else {
            info!("[tool] unknown function requested: {name}");
            return format!("Error: unknown function '{name}'");
        };

        if self.validate_args
            && let Some(error) = validate_tool_arguments(tool.as_ref(), arguments)
        {
            return error;
        }

        log_tool_call(name, arguments);
        let start = std::time::Instant::now();
        let result = tool.execute(arguments).await;

        debug!(
            "Tool {name} completed in {:.0}ms ({} bytes)",
            start.elapsed().as_secs_f64() * 1000.0,
            result.len()
        );
        trace!(
            "Tool {name} result preview: {}",
            result.chars().take(300).collect::<String>()
        );

        truncate_result(result, self.max_result_bytes)
    }
}

impl Default for ToolSet {
    fn default() -> Self {
        Self::new()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Normalize a raw argument string: models send `""` for tools without
/// parameters.
pub fn normalize_arguments(arguments: &str) -> &str {
    if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    }
}

/// Validate tool arguments against the tool's declared JSON Schema.
///
/// Returns `None` if valid, or `Some(error_string)` formatted for the model
/// to read and self-correct.
pub fn validate_tool_arguments(tool: &dyn Tool, arguments: &str) -> Option<String> {
    let args_value: serde_json::Value = match serde_json::from_str(normalize_arguments(arguments))
    {
        Ok(v) => v,
        Err(e) => {
            return Some(format!(
                "Error: invalid JSON arguments for function '{}': {e}. \
                 Please provide valid JSON matching the function's parameter schema.",
                tool.name()
            ));
        }
    };

    let schema = tool.definition().function.parameters;

    // An invalid schema skips validation.
    let validator = match jsonschema::validator_for(&schema) {
        Ok(v) => v,
        Err(_) => return None,
    };

    let errors: Vec<String> = validator
        .iter_errors(&args_value)
        .map(|e| format!("  - {}: {e}", e.instance_path()))
        .collect();

    if errors.is_empty() {
        None
    } else {
        Some(format!(
            "Error: argument validation failed for function '{}':\n{}\n\
             Please fix the arguments and try again.",
            tool.name(),
            errors.join("\n")
        ))
    }
}

/// Log a tool call at INFO level with a truncated preview of arguments.
pub fn log_tool_call(name: &str, arguments: &str) {
    let args_preview: String = arguments.chars().take(120).collect();
    info!(
        "[tool] {}({args_preview}{})",
        name,
        if arguments.chars().count() > 120 { "..." } else { "" }
    );
    trace!("[tool] {name} arguments: {arguments}");
}

/// Truncate a string to at most `max` bytes (on a char boundary), appending
/// a notice if trimmed.
pub fn truncate_result(s: String, max: usize) -> String {
    if s.len() <= max {
        return s;
    }
    let cut = (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0);
    let head = s.get(..cut).unwrap_or_default();
    format!("{head}...\n[truncated: {} bytes total]", s.len())
}

/// Parse raw JSON arguments into a typed struct, or an error string suitable
/// for returning directly from [`Tool::execute`].
pub fn parse_tool_args<T: serde::de::DeserializeOwned>(arguments: &str) -> Result<T, String> {
    serde_json::from_str(normalize_arguments(arguments)).map_err(|e| {
        format!(
            "Error: invalid function arguments: {e}. \
             Please provide valid JSON matching the function's parameter schema."
        )
    })
}
