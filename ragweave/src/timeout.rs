//! Per-call time limits for external capabilities.
//!
//! Each decorator wraps one capability and races every call against `tokio::time::timeout`.
//! An expired call surfaces as [`AgentError::Timeout`] (or [`ToolSourceError::Timeout`] for
//! tools), aborting the turn like any other capability failure.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::embedding::Embedder;
use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;
use crate::tool_source::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

async fn bounded<T, F>(capability: &'static str, limit: Duration, fut: F) -> Result<T, AgentError>
where
    F: Future<Output = Result<T, AgentError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(capability, ?limit, "capability call timed out");
            Err(AgentError::Timeout { capability, limit })
        }
    }
}

/// Chat model with a per-call time limit.
pub struct TimeoutLlm {
    inner: Arc<dyn LlmClient>,
    limit: Duration,
}

impl TimeoutLlm {
    pub fn new(inner: Arc<dyn LlmClient>, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl LlmClient for TimeoutLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        bounded("llm", self.limit, self.inner.invoke(messages)).await
    }

    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<LlmResponse, AgentError> {
        bounded("llm", self.limit, self.inner.invoke_with_tools(messages, tools)).await
    }
}

/// Embedder with a per-call time limit.
pub struct TimeoutEmbedder {
    inner: Arc<dyn Embedder>,
    limit: Duration,
}

impl TimeoutEmbedder {
    pub fn new(inner: Arc<dyn Embedder>, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl Embedder for TimeoutEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, AgentError> {
        bounded("embedding", self.limit, self.inner.embed(texts)).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}

/// Tool source whose calls have a time limit; listing is not bounded.
pub struct TimeoutToolSource {
    inner: Arc<dyn ToolSource>,
    limit: Duration,
}

impl TimeoutToolSource {
    pub fn new(inner: Arc<dyn ToolSource>, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl ToolSource for TimeoutToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        self.inner.list_tools().await
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        match tokio::time::timeout(self.limit, self.inner.call_tool(name, arguments)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(tool = %name, limit = ?self.limit, "tool call timed out");
                Err(ToolSourceError::Timeout(self.limit))
            }
        }
    }
}
