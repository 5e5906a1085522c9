//! Function-calling tools.
//!
//! Every analytics question is a [`Tool`] implementor collected into a
//! [`ToolSet`], which handles dispatch by name, JSON Schema validation of
//! arguments, and result truncation.
//!
//! - [`core`] — [`Tool`] trait, [`ToolSet`], argument helpers.
//! - [`spec`] — [`ToolSpec`](spec::ToolSpec) builder for descriptions with
//!   usage guidance and examples.
//! - [`analytics`] — [`AnalyticsCall`] (typed arguments per question) and
//!   [`ToolSet::with_analytics_tools`].
//! - [`names`] — tool name constants.

pub mod analytics;
pub mod core;
pub mod names;
pub mod spec;

pub use analytics::{AnalyticsCall, AnalyticsTool, analytics_specs};
pub use core::{
    DEFAULT_MAX_RESULT_BYTES, Tool, ToolFuture, ToolSet, parse_tool_args, truncate_result,
    validate_tool_arguments,
};
pub use spec::ToolSpec;
