//! Chunk extraction from tool output and folding chunks into the context.

use async_trait::async_trait;

use crate::agent::topology::{EXTRACT_CHUNKS, UPDATE_CONTEXT};
use crate::context::update_context;
use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::message::Message;
use crate::state::AgentState;
use crate::tool_source::PASSAGE_SEPARATOR;

/// Splits the latest message on blank lines into `chunks`.
///
/// Only the latest message is read: when one routing step ran several tools, the earlier
/// results are not extracted. Text without blank lines yields a single chunk.
pub struct ExtractChunksNode;

#[async_trait]
impl Node<AgentState> for ExtractChunksNode {
    fn id(&self) -> &str {
        EXTRACT_CHUNKS
    }

    async fn run(&self, mut state: AgentState) -> Result<(AgentState, Next), AgentError> {
        let chunks: Vec<String> = state
            .last_content()
            .split(PASSAGE_SEPARATOR)
            .map(str::to_string)
            .collect();
        tracing::debug!(count = chunks.len(), "chunks extracted");
        state
            .messages
            .push(Message::assistant(format!("{} chunks extracted", chunks.len())));
        state.chunks = Some(chunks);
        Ok((state, Next::Continue))
    }
}

pub struct UpdateContextNode;

#[async_trait]
impl Node<AgentState> for UpdateContextNode {
    fn id(&self) -> &str {
        UPDATE_CONTEXT
    }

    async fn run(&self, mut state: AgentState) -> Result<(AgentState, Next), AgentError> {
        update_context(&mut state);
        Ok((state, Next::Continue))
    }
}
