//! One node per RAG step. Every node implements `Node<AgentState>`, appends at least one
//! message to the transcript and returns `Next::Continue`; edges and routers pick what runs
//! next.

mod answer;
mod chunks;
mod conversation;
mod retrieval;
mod scoring;

pub use answer::{AnswerValidationNode, GenerateAnswerNode};
pub use chunks::{ExtractChunksNode, UpdateContextNode};
pub use conversation::{
    HistoryNode, QueryTransformNode, QueryTransformStrategy, QueryValidationNode,
};
pub use retrieval::{RetrieveOrRespondNode, ToolExecutionNode, ToolRoutingNode, NO_TOOLS_TO_CALL};
pub use scoring::{RerankingNode, SelectionNode};

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;

/// Sends one rendered prompt as a user message.
async fn complete(llm: &dyn LlmClient, prompt: String) -> Result<LlmResponse, AgentError> {
    llm.invoke(&[Message::user(prompt)]).await
}

fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}
