//! Conversational assistant over the analytics tools.
//!
//! One question is one exchange: the model sees the system prompt, the
//! running history, and the question, along with every tool definition. If
//! it answers with tool calls, the first one is executed, its JSON result
//! appended, and a second completion (without tools) produces the reply.
//! Any further tool calls in the same response are ignored.

use crate::chat::{ChatBackend, ChatRequest, DEFAULT_CHAT_MODEL};
use crate::tools::ToolSet;
use crate::Message;
use tracing::{info, warn};

/// Model settings for [`Assistant`].
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub model: String,
    pub system_prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl AssistantConfig {
    pub fn new(model: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: system_prompt.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CHAT_MODEL, "You are a helpful restaurant operations assistant.")
    }
}

/// A conversation with tool access and an append-only history of
/// (question, reply) pairs.
pub struct Assistant {
    backend: Box<dyn ChatBackend>,
    tools: ToolSet,
    config: AssistantConfig,
    history: Vec<Message>,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("model", &self.config.model)
            .field("tools", &self.tools)
            .field("history_len", &self.history.len())
            .finish()
    }
}

impl Assistant {
    pub fn new(backend: impl ChatBackend + 'static, tools: ToolSet, config: AssistantConfig) -> Self {
        Self {
            backend: Box::new(backend),
            tools,
            config,
            history: Vec::new(),
        }
    }

    /// Prior turns, alternating user and assistant messages.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    fn request(&self, messages: Vec<Message>, with_tools: bool) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            tools: with_tools.then(|| self.tools.definitions()),
            tool_choice: with_tools.then(|| "auto".to_string()),
        }
    }

    /// Answer one question. On failure the history is left untouched.
    pub async fn ask(&mut self, question: &str) -> Result<String, String> {
        let mut messages = Vec::with_capacity(self.history.len() + 4);
        messages.push(Message::system(self.config.system_prompt.clone()));
        messages.extend(self.history.iter().cloned());
        messages.push(Message::user(question));

        let first = self
            .backend
            .chat(&self.request(messages.clone(), !self.tools.is_empty()))
            .await?;

        let reply = match first.tool_calls.first() {
            Some(call) => {
                if first.tool_calls.len() > 1 {
                    warn!(
                        "Model requested {} tool calls; executing only {}",
                        first.tool_calls.len(),
                        call.function.name
                    );
                }
                info!("Executing {}", call.function.name);
                let result = self
                    .tools
                    .execute(&call.function.name, &call.function.arguments)
                    .await;

                messages.push(Message::assistant_tool_calls(vec![call.clone()]));
                messages.push(Message::tool_result(call.id.clone(), result));

                let second = self.backend.chat(&self.request(messages, false)).await?;
                second.content
            }
            None => first.content,
        };

        let reply = reply.ok_or_else(|| "Empty LLM response".to_string())?;
        self.history.push(Message::user(question));
        self.history.push(Message::assistant_text(reply.clone()));
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::{dataset, today};
    use crate::chat::ChatCompletion;
    use crate::{MessageRole, ToolCall};
    use futures::future::BoxFuture;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays canned completions and records every request.
    #[derive(Clone, Default)]
    struct ScriptedBackend {
        replies: Arc<Mutex<VecDeque<Result<ChatCompletion, String>>>>,
        requests: Arc<Mutex<Vec<ChatRequest>>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<ChatCompletion, String>>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(replies.into())),
                requests: Arc::default(),
            }
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl ChatBackend for ScriptedBackend {
        fn chat<'a>(
            &'a self,
            body: &'a ChatRequest,
        ) -> BoxFuture<'a, Result<ChatCompletion, String>> {
            self.requests.lock().unwrap().push(body.clone());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err("script exhausted".into()));
            Box::pin(async move { reply })
        }
    }

    fn text(s: &str) -> Result<ChatCompletion, String> {
        Ok(ChatCompletion {
            content: Some(s.into()),
            ..Default::default()
        })
    }

    fn calls(calls: Vec<ToolCall>) -> Result<ChatCompletion, String> {
        Ok(ChatCompletion {
            tool_calls: calls,
            ..Default::default()
        })
    }

    fn assistant(backend: &ScriptedBackend) -> Assistant {
        let tools = ToolSet::new()
            .with_arg_validation(true)
            .with_analytics_tools(Arc::new(dataset()), today());
        Assistant::new(backend.clone(), tools, AssistantConfig::new("test-model", "Be Betty."))
    }

    #[tokio::test]
    async fn plain_reply_extends_history() {
        let backend = ScriptedBackend::new(vec![text("Hasta la vista.")]);
        let mut a = assistant(&backend);

        let reply = a.ask("hello").await.unwrap();

        assert_eq!(reply, "Hasta la vista.");
        assert_eq!(a.history().len(), 2);
        assert_eq!(a.history()[0].role, MessageRole::User);

        let req = &backend.requests()[0];
        assert_eq!(req.model, "test-model");
        assert_eq!(req.messages[0].content.as_deref(), Some("Be Betty."));
        assert_eq!(req.tools.as_ref().map(Vec::len), Some(12));
    }

    #[tokio::test]
    async fn tool_call_runs_then_second_completion_has_no_tools() {
        let backend = ScriptedBackend::new(vec![
            calls(vec![ToolCall::function(
                "call_1",
                "get_top_vendors_by_spend",
                r#"{"limit":1}"#,
            )]),
            text("Vino Co. Top vendor."),
        ]);
        let mut a = assistant(&backend);

        let reply = a.ask("who do we spend most with?").await.unwrap();
        assert_eq!(reply, "Vino Co. Top vendor.");

        let requests = backend.requests();
        assert_eq!(requests.len(), 2);
        let second = &requests[1];
        assert!(second.tools.is_none());
        let tool_msg = second.messages.last().unwrap();
        assert_eq!(tool_msg.role, MessageRole::Tool);
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_1"));
        assert!(tool_msg.content.as_deref().unwrap().contains("Vino Co"));

        // History keeps only the question and the final reply.
        assert_eq!(a.history().len(), 2);
    }

    #[tokio::test]
    async fn only_first_tool_call_is_executed() {
        let backend = ScriptedBackend::new(vec![
            calls(vec![
                ToolCall::function("a", "list_all_vendors", "{}"),
                ToolCall::function("b", "get_data_summary", "{}"),
            ]),
            text("Done."),
        ]);
        let mut a = assistant(&backend);
        a.ask("vendors and summary").await.unwrap();

        let second = &backend.requests()[1];
        let tool_results: Vec<_> = second
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::Tool)
            .collect();
        assert_eq!(tool_results.len(), 1);
        assert_eq!(tool_results[0].tool_call_id.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn unknown_function_result_is_sent_back() {
        let backend = ScriptedBackend::new(vec![
            calls(vec![ToolCall::function("x", "order_pizza", "{}")]),
            text("Negative."),
        ]);
        let mut a = assistant(&backend);
        assert_eq!(a.ask("pizza?").await.unwrap(), "Negative.");

        let tool_msg = backend.requests()[1].messages.last().cloned().unwrap();
        assert_eq!(
            tool_msg.content.as_deref(),
            Some("Error: unknown function 'order_pizza'")
        );
    }

    #[tokio::test]
    async fn failed_turn_leaves_history_unchanged() {
        let backend = ScriptedBackend::new(vec![
            text("first"),
            Err("HTTP 500".into()),
        ]);
        let mut a = assistant(&backend);
        a.ask("one").await.unwrap();

        let err = a.ask("two").await.unwrap_err();
        assert_eq!(err, "HTTP 500");
        assert_eq!(a.history().len(), 2);
    }

    #[tokio::test]
    async fn history_is_replayed_on_next_turn() {
        let backend = ScriptedBackend::new(vec![text("first"), text("second")]);
        let mut a = assistant(&backend);
        a.ask("one").await.unwrap();
        a.ask("two").await.unwrap();

        let req = &backend.requests()[1];
        // system, user one, assistant first, user two
        assert_eq!(req.messages.len(), 4);
        assert_eq!(req.messages[2].content.as_deref(), Some("first"));
    }
}
