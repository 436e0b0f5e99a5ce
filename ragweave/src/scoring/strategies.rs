//! Relevance scoring strategies.
//!
//! Every scorer returns one score per chunk, index-aligned with its input. Chunks are scored
//! independently; the semantic scorer issues its judge calls concurrently and keeps order.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::embedding::{euclidean_distance, Embedder};
use crate::error::{AgentError, ConfigError};
use crate::llm::LlmClient;
use crate::message::Message;
use crate::prompts::PromptTemplate;

/// Reranking strategy names accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerankStrategy {
    /// LLM judge rates each chunk against the question.
    Semantic,
    /// Embedding distance between question and chunk.
    Distance,
}

impl RerankStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Distance => "distance",
        }
    }
}

impl FromStr for RerankStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "semantic" => Ok(Self::Semantic),
            "distance" => Ok(Self::Distance),
            other => Err(ConfigError::UnsupportedStrategy {
                kind: "reranking",
                name: other.to_string(),
            }),
        }
    }
}

/// Parses a judge reply as a score. Anything that is not a finite number scores `0.0`.
pub fn parse_semantic_score(reply: &str) -> f64 {
    match reply.trim().parse::<f64>() {
        Ok(score) if score.is_finite() => score,
        _ => {
            tracing::debug!(reply = %reply, "unparsable semantic score, using 0");
            0.0
        }
    }
}

/// `1 / (1 + euclidean distance)`: `1.0` for identical vectors, toward `0.0` as they diverge.
pub fn distance_score(question: &[f32], chunk: &[f32]) -> f64 {
    1.0 / (1.0 + euclidean_distance(question, chunk))
}

/// One reranking strategy: scores every chunk against the question.
#[async_trait]
pub trait ChunkScorer: Send + Sync {
    fn strategy(&self) -> RerankStrategy;

    /// One score per chunk, same order as `chunks`.
    async fn score(&self, question: &str, chunks: &[String]) -> Result<Vec<f64>, AgentError>;
}

/// Asks a judge model for a 0..1 relevance score per chunk.
pub struct SemanticScorer {
    judge: Arc<dyn LlmClient>,
    prompt: PromptTemplate,
}

impl SemanticScorer {
    /// `prompt` receives `{question}` and `{chunk}`.
    pub fn new(judge: Arc<dyn LlmClient>, prompt: PromptTemplate) -> Self {
        Self { judge, prompt }
    }

    async fn score_one(&self, question: &str, chunk: &str) -> Result<f64, AgentError> {
        let prompt = self
            .prompt
            .render(&[("question", question), ("chunk", chunk)])?;
        let reply = self.judge.invoke(&[Message::user(prompt)]).await?;
        Ok(parse_semantic_score(&reply.content))
    }
}

#[async_trait]
impl ChunkScorer for SemanticScorer {
    fn strategy(&self) -> RerankStrategy {
        RerankStrategy::Semantic
    }

    async fn score(&self, question: &str, chunks: &[String]) -> Result<Vec<f64>, AgentError> {
        try_join_all(chunks.iter().map(|chunk| self.score_one(question, chunk))).await
    }
}

/// Scores chunks by embedding distance to the question.
pub struct DistanceScorer {
    embedder: Arc<dyn Embedder>,
}

impl DistanceScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }
}

#[async_trait]
impl ChunkScorer for DistanceScorer {
    fn strategy(&self) -> RerankStrategy {
        RerankStrategy::Distance
    }

    async fn score(&self, question: &str, chunks: &[String]) -> Result<Vec<f64>, AgentError> {
        let mut texts: Vec<&str> = Vec::with_capacity(chunks.len() + 1);
        texts.push(question);
        texts.extend(chunks.iter().map(String::as_str));
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != texts.len() {
            return Err(AgentError::embedding(format!(
                "expected {} vectors, got {}",
                texts.len(),
                vectors.len()
            )));
        }
        let (question_vector, chunk_vectors) = vectors.split_at(1);
        Ok(chunk_vectors
            .iter()
            .map(|v| distance_score(&question_vector[0], v))
            .collect())
    }
}
