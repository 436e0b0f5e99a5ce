//! Mock LLM for tests.
//!
//! Replies are picked by marker: each rule pairs a substring of the prompt with a scripted
//! sequence of responses. The first rule whose marker occurs in the last message wins; the
//! rule then hands out its responses in order and repeats the last one once exhausted.
//! Prompts that match no rule fall back to a default sequence with the same behavior.
//! Every call is recorded so tests can assert on what a node actually sent.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::{Message, ToolCall};
use crate::tool_source::ToolSpec;

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    /// Names of the tools offered with this call; empty for a plain `invoke`.
    pub tools: Vec<String>,
}

impl RecordedCall {
    /// Content of the last message sent (the rendered prompt).
    pub fn prompt(&self) -> &str {
        self.messages.last().map(Message::content).unwrap_or("")
    }
}

struct Script {
    responses: Vec<LlmResponse>,
    served: AtomicUsize,
}

impl Script {
    fn new(responses: Vec<LlmResponse>) -> Self {
        Self {
            responses,
            served: AtomicUsize::new(0),
        }
    }

    fn next(&self) -> Option<LlmResponse> {
        let n = self.served.fetch_add(1, Ordering::SeqCst);
        let last = self.responses.len().checked_sub(1)?;
        self.responses.get(n.min(last)).cloned()
    }
}

/// Mock LLM: scripted replies keyed by prompt markers, plus a default sequence.
pub struct MockLlm {
    rules: Vec<(String, Script)>,
    fallback: Script,
    failure: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockLlm {
    /// Creates a mock that answers every prompt with `content`.
    pub fn with_reply(content: impl Into<String>) -> Self {
        Self::with_replies([content.into()])
    }

    /// Creates a mock that answers prompts in order with `replies`, repeating the last one.
    pub fn with_replies<I, T>(replies: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            rules: Vec::new(),
            fallback: Script::new(replies.into_iter().map(|r| LlmResponse::text(r)).collect()),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::with_replies(Vec::<String>::new())
        }
    }

    /// Answers prompts containing `marker` with `reply` (builder).
    pub fn on(self, marker: impl Into<String>, reply: impl Into<String>) -> Self {
        self.on_response(marker, LlmResponse::text(reply))
    }

    /// Answers prompts containing `marker` with `replies` in order (builder).
    pub fn on_sequence<I, T>(mut self, marker: impl Into<String>, replies: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let responses = replies.into_iter().map(|r| LlmResponse::text(r)).collect();
        self.rules.push((marker.into(), Script::new(responses)));
        self
    }

    /// Answers prompts containing `marker` with a full response (builder).
    pub fn on_response(mut self, marker: impl Into<String>, response: LlmResponse) -> Self {
        self.rules
            .push((marker.into(), Script::new(vec![response])));
        self
    }

    /// Answers prompts containing `marker` with a single tool call request (builder).
    pub fn on_tool_call(
        self,
        marker: impl Into<String>,
        tool: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        let call = ToolCall {
            name: tool.into(),
            arguments: arguments.to_string(),
            id: Some("call-1".to_string()),
        };
        self.on_response(marker, LlmResponse::with_tool_calls("", vec![call]))
    }

    /// Snapshot of every call made so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn record(&self, messages: &[Message], tools: &[ToolSpec]) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedCall {
                messages: messages.to_vec(),
                tools: tools.iter().map(|t| t.name.clone()).collect(),
            });
    }

    fn respond(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        if let Some(message) = &self.failure {
            return Err(AgentError::llm(message.clone()));
        }
        let prompt = messages.last().map(Message::content).unwrap_or("");
        let script = self
            .rules
            .iter()
            .find(|(marker, _)| prompt.contains(marker.as_str()))
            .map(|(_, script)| script)
            .unwrap_or(&self.fallback);
        script
            .next()
            .ok_or_else(|| AgentError::llm(format!("no scripted reply for prompt: {}", prompt)))
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        self.record(messages, &[]);
        self.respond(messages)
    }

    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<LlmResponse, AgentError> {
        self.record(messages, tools);
        self.respond(messages)
    }
}
