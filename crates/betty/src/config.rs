//! Assistant configuration read from the environment.
//!
//! [`BettyConfig`] collects the chat-completion settings and snapshot
//! location, and converts them into `marginedge` types via
//! [`build_assistant_config`](BettyConfig::build_assistant_config) and
//! [`build_tool_set`](BettyConfig::build_tool_set).

use chrono::NaiveDate;
use marginedge::analytics::Dataset;
use marginedge::assistant::AssistantConfig;
use marginedge::chat::DEFAULT_CHAT_MODEL;
use marginedge::config::ConfigError;
use marginedge::snapshot::DEFAULT_SNAPSHOT_FILE;
use marginedge::tools::ToolSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::prompt::betty_system_prompt;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const MODEL_VAR: &str = "OPENAI_MODEL";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const SNAPSHOT_VAR: &str = "SNAPSHOT_PATH";
pub const TEMPERATURE_VAR: &str = "OPENAI_TEMPERATURE";
pub const MAX_TOKENS_VAR: &str = "OPENAI_MAX_TOKENS";

/// Default chat-completions API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Settings for one assistant session.
#[derive(Debug, Clone, PartialEq)]
pub struct BettyConfig {
    /// Bearer token for the chat endpoint.
    pub api_key: String,
    /// Model identifier. Default: `"gpt-3.5-turbo"`.
    pub model: String,
    /// API root; `/chat/completions` is appended. Default: OpenAI.
    pub base_url: String,
    /// Snapshot file to answer from. Default: `restaurant_data.json`.
    pub snapshot_path: PathBuf,
    /// Sampling temperature. Default: provider's.
    pub temperature: Option<f32>,
    /// Maximum tokens per reply. Default: provider's.
    pub max_tokens: Option<u32>,
}

impl BettyConfig {
    /// Defaults around an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_FILE),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = Self::new(get(API_KEY_VAR).ok_or(ConfigError::Missing(API_KEY_VAR))?);
        if let Some(model) = get(MODEL_VAR) {
            config.model = model;
        }
        if let Some(url) = get(BASE_URL_VAR) {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(path) = get(SNAPSHOT_VAR) {
            config.snapshot_path = PathBuf::from(path);
        }
        if let Some(raw) = get(TEMPERATURE_VAR) {
            config.temperature = Some(raw.parse().map_err(|e| ConfigError::Invalid {
                var: TEMPERATURE_VAR,
                reason: format!("'{raw}': {e}"),
            })?);
        }
        if let Some(raw) = get(MAX_TOKENS_VAR) {
            config.max_tokens = Some(raw.parse().map_err(|e| ConfigError::Invalid {
                var: MAX_TOKENS_VAR,
                reason: format!("'{raw}': {e}"),
            })?);
        }
        Ok(config)
    }

    /// Full chat-completions URL.
    pub fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Model settings with Betty's system prompt.
    pub fn build_assistant_config(&self) -> AssistantConfig {
        let mut config = AssistantConfig::new(self.model.clone(), betty_system_prompt());
        if let Some(t) = self.temperature {
            config = config.with_temperature(t);
        }
        if let Some(n) = self.max_tokens {
            config = config.with_max_tokens(n);
        }
        config
    }

    /// Every analytics tool over `dataset`, with argument validation.
    pub fn build_tool_set(&self, dataset: Arc<Dataset>, today: NaiveDate) -> ToolSet {
        ToolSet::new()
            .with_arg_validation(true)
            .with_analytics_tools(dataset, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = BettyConfig::from_lookup(lookup(&[(API_KEY_VAR, "sk-1")])).unwrap();
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.snapshot_path, PathBuf::from("restaurant_data.json"));
        assert_eq!(config.chat_url(), "https://api.openai.com/v1/chat/completions");
        assert_eq!(config.temperature, None);
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = BettyConfig::from_lookup(lookup(&[(MODEL_VAR, "gpt-4o")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(API_KEY_VAR));
    }

    #[test]
    fn overrides_are_read() {
        let config = BettyConfig::from_lookup(lookup(&[
            (API_KEY_VAR, "sk-1"),
            (MODEL_VAR, "gpt-4o-mini"),
            (BASE_URL_VAR, "http://localhost:11434/v1/"),
            (SNAPSHOT_VAR, "/tmp/data.json"),
            (TEMPERATURE_VAR, "0.2"),
            (MAX_TOKENS_VAR, "512"),
        ]))
        .unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.chat_url(), "http://localhost:11434/v1/chat/completions");
        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/data.json"));
        assert_eq!(config.temperature, Some(0.2));
        assert_eq!(config.max_tokens, Some(512));

        let assistant = config.build_assistant_config();
        assert_eq!(assistant.model, "gpt-4o-mini");
        assert_eq!(assistant.max_tokens, Some(512));
        assert!(assistant.system_prompt.starts_with("You are Betty"));
    }

    #[test]
    fn unparsable_number_is_invalid() {
        let err = BettyConfig::from_lookup(lookup(&[
            (API_KEY_VAR, "sk-1"),
            (MAX_TOKENS_VAR, "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: MAX_TOKENS_VAR, .. }));
    }

    #[test]
    fn tool_set_has_every_analytics_tool() {
        let config = BettyConfig::new("sk");
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let tools = config.build_tool_set(Arc::new(Dataset::default()), today);
        assert_eq!(tools.len(), 12);
    }
}
