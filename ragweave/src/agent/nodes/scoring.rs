//! Reranking and selection nodes.

use async_trait::async_trait;

use crate::agent::topology::{RERANKING, SELECTION};
use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::message::Message;
use crate::scoring::{Reranker, Selector};
use crate::state::AgentState;

/// Scores `chunks` against `original_question` and writes `reranking_score`.
pub struct RerankingNode {
    reranker: Reranker,
}

impl RerankingNode {
    pub fn new(reranker: Reranker) -> Self {
        Self { reranker }
    }
}

#[async_trait]
impl Node<AgentState> for RerankingNode {
    fn id(&self) -> &str {
        RERANKING
    }

    async fn run(&self, mut state: AgentState) -> Result<(AgentState, Next), AgentError> {
        let chunks = state
            .chunks
            .as_deref()
            .ok_or_else(|| AgentError::InvalidState("no chunks to rerank".into()))?;
        let scores = self
            .reranker
            .rerank(&state.original_question, chunks)
            .await?;
        tracing::debug!(strategies = ?self.reranker.strategies(), ?scores, "reranked");
        state.messages.push(Message::assistant(format!(
            "weighted average score between all reranking techniques: {:?}",
            scores
        )));
        state.reranking_score = Some(scores);
        Ok((state, Next::Continue))
    }
}

/// Filters the scored chunks and clears `reranking_score`.
pub struct SelectionNode {
    selector: Selector,
}

impl SelectionNode {
    pub fn new(selector: Selector) -> Self {
        Self { selector }
    }
}

#[async_trait]
impl Node<AgentState> for SelectionNode {
    fn id(&self) -> &str {
        SELECTION
    }

    async fn run(&self, mut state: AgentState) -> Result<(AgentState, Next), AgentError> {
        let (chunks, scores) = state.scored_chunks()?;
        let (chunks, _) = self.selector.select(chunks.to_vec(), scores.to_vec());
        tracing::debug!(count = chunks.len(), "chunks selected");
        state
            .messages
            .push(Message::assistant(format!("{} chunks selected", chunks.len())));
        state.chunks = Some(chunks);
        state.reranking_score = None;
        Ok((state, Next::Continue))
    }
}
