//! Chat model abstraction used by every LLM-driven node.
//!
//! Nodes render a prompt template, send it as a single user message and read back an
//! [`LlmResponse`]: text plus optional tool-call requests. Providers live outside this crate
//! and implement [`LlmClient`]; [`MockLlm`] serves tests.
//!
//! # Tool binding
//!
//! [`bind_tools`] returns a [`ToolBoundLlm`]: the same model, aware of a fixed tool set, so a
//! plain `invoke` goes through [`LlmClient::invoke_with_tools`]. The tool routing node holds
//! one of these.

mod mock;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::{Message, ToolCall};
use crate::tool_source::ToolSpec;

pub use mock::{MockLlm, RecordedCall};

/// Response from an LLM completion: assistant text and optional tool calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmResponse {
    /// Assistant message content (plain text).
    pub content: String,
    /// Tool calls requested by the model; empty means a plain answer.
    pub tool_calls: Vec<ToolCall>,
}

impl LlmResponse {
    /// A plain text response.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: vec![],
        }
    }

    /// A response that requests tool calls.
    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
        }
    }

    /// Transcript entry for this response.
    pub fn into_message(self) -> Message {
        Message::assistant_with_tool_calls(self.content, self.tool_calls)
    }
}

/// LLM client: given messages, returns assistant text and optional tool_calls.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Invoke one completion over `messages`.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError>;

    /// Invoke with a tool set the model may request calls from.
    ///
    /// Default implementation ignores `tools` and calls `invoke`.
    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<LlmResponse, AgentError> {
        let _ = tools;
        self.invoke(messages).await
    }
}

/// A chat model bound to a fixed tool set.
pub struct ToolBoundLlm {
    inner: Arc<dyn LlmClient>,
    tools: Vec<ToolSpec>,
}

impl ToolBoundLlm {
    pub fn tools(&self) -> &[ToolSpec] {
        &self.tools
    }
}

#[async_trait]
impl LlmClient for ToolBoundLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        self.inner.invoke_with_tools(messages, &self.tools).await
    }

    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<LlmResponse, AgentError> {
        self.inner.invoke_with_tools(messages, tools).await
    }
}

/// Binds `tools` to `llm`; every plain `invoke` on the result offers those tools.
pub fn bind_tools(llm: Arc<dyn LlmClient>, tools: Vec<ToolSpec>) -> ToolBoundLlm {
    ToolBoundLlm { inner: llm, tools }
}
