//! Tool source abstraction: list tools and call a tool.
//!
//! The RAG graph depends on `ToolSource` instead of a concrete tool registry: the tool
//! routing node binds `list_tools()` to the chat model, the tool execution node runs each
//! requested call through `call_tool`. Implementations: [`RetrieverToolSource`] (one
//! retriever per topic index), [`CompositeToolSource`] (several sources behind one),
//! [`MockToolSource`] (tests).

mod composite;
mod mock;
mod retriever;

pub use composite::CompositeToolSource;
pub use mock::MockToolSource;
pub use retriever::{RetrieverToolSource, VectorIndex, PASSAGE_SEPARATOR};

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::error::AgentError;

/// Tool specification, aligned with MCP `tools/list` result item.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolSpec {
    /// Tool name (e.g. `physics_retriever`).
    pub name: String,
    /// Human-readable description for the LLM.
    pub description: Option<String>,
    /// JSON Schema for arguments (MCP inputSchema).
    pub input_schema: Value,
}

/// Result of a single tool call; aligns with MCP `tools/call` content.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallContent {
    /// Result text. Retrievers separate passages with a blank line.
    pub text: String,
}

/// Errors from listing or calling tools.
#[derive(Debug, Error)]
pub enum ToolSourceError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("tool call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<ToolSourceError> for AgentError {
    fn from(e: ToolSourceError) -> Self {
        match e {
            ToolSourceError::Timeout(limit) => AgentError::Timeout {
                capability: "tool",
                limit,
            },
            other => AgentError::Capability {
                capability: "tool",
                message: other.to_string(),
            },
        }
    }
}

/// Tool source: list tools and call a tool.
#[async_trait]
pub trait ToolSource: Send + Sync {
    /// List available tools.
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError>;

    /// Call a tool by name with JSON arguments.
    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of each ToolSourceError variant contains expected keywords.
    #[test]
    fn tool_source_error_display_all_variants() {
        let s = ToolSourceError::NotFound("x".into()).to_string();
        assert!(s.contains("not found"), "{}", s);
        let s = ToolSourceError::InvalidInput("bad".into()).to_string();
        assert!(s.contains("invalid"), "{}", s);
        let s = ToolSourceError::Transport("net".into()).to_string();
        assert!(s.contains("transport"), "{}", s);
    }

    #[test]
    fn tool_source_error_becomes_tool_capability_failure() {
        let err: AgentError = ToolSourceError::NotFound("math_retriever".into()).into();
        match err {
            AgentError::Capability {
                capability,
                message,
            } => {
                assert_eq!(capability, "tool");
                assert!(message.contains("math_retriever"));
            }
            other => panic!("expected Capability, got {:?}", other),
        }
    }
}
