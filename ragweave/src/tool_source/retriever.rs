//! Retrieval tools: one `<topic>_retriever` tool per topic-labelled vector index.
//!
//! A call embeds the query, ranks the index entries by cosine similarity and returns the
//! top `k` passages as one text, passages separated by a blank line. The chunk extraction
//! node splits that text back into chunks.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};
use crate::embedding::{cosine_similarity, Embedder};

/// Separator between passages in a retriever's reply.
pub const PASSAGE_SEPARATOR: &str = "\n\n";

const TOOL_SUFFIX: &str = "_retriever";

/// In-memory, topic-labelled index of `(text, embedding)` entries.
pub struct VectorIndex {
    topic: String,
    embedder: Arc<dyn Embedder>,
    entries: Vec<(String, Vec<f32>)>,
}

impl VectorIndex {
    pub fn new(topic: impl Into<String>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            topic: topic.into(),
            embedder,
            entries: Vec::new(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embeds `texts` in one batch and stores them.
    pub async fn add_texts(&mut self, texts: &[&str]) -> Result<(), ToolSourceError> {
        let vectors = self
            .embedder
            .embed(texts)
            .await
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        if vectors.len() != texts.len() {
            return Err(ToolSourceError::Transport(format!(
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            )));
        }
        self.entries.extend(
            texts
                .iter()
                .map(|t| t.to_string())
                .zip(vectors),
        );
        Ok(())
    }

    /// Top `k` entries by cosine similarity to `query`, best first. Ties keep insertion order;
    /// entries whose similarity is NaN rank last.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<String>, ToolSourceError> {
        let query_vector = self
            .embedder
            .embed(&[query])
            .await
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| ToolSourceError::Transport("embedder returned no vector".into()))?;
        let mut scored: Vec<(f32, &str)> = self
            .entries
            .iter()
            .map(|(text, v)| {
                let similarity = cosine_similarity(&query_vector, v);
                let similarity = if similarity.is_nan() { f32::NEG_INFINITY } else { similarity };
                (similarity, text.as_str())
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, text)| text.to_string())
            .collect())
    }
}

/// Exposes each index as a retriever tool returning its top `k` passages.
pub struct RetrieverToolSource {
    indexes: Vec<VectorIndex>,
    k: usize,
}

impl RetrieverToolSource {
    pub fn new(indexes: Vec<VectorIndex>, k: usize) -> Self {
        Self { indexes, k }
    }

    /// Topic labels of the indexes, in registration order.
    pub fn topics(&self) -> Vec<String> {
        self.indexes.iter().map(|i| i.topic.clone()).collect()
    }

    fn spec_for(index: &VectorIndex) -> ToolSpec {
        ToolSpec {
            name: format!("{}{}", index.topic, TOOL_SUFFIX),
            description: Some(format!(
                "this tool is used to retrieve informations about the topic {}",
                index.topic
            )),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "query to look up in the topic's documents"
                    }
                },
                "required": ["query"]
            }),
        }
    }
}

#[async_trait]
impl ToolSource for RetrieverToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.indexes.iter().map(Self::spec_for).collect())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let index = name
            .strip_suffix(TOOL_SUFFIX)
            .and_then(|topic| self.indexes.iter().find(|i| i.topic == topic))
            .ok_or_else(|| ToolSourceError::NotFound(name.to_string()))?;
        let query = arguments
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolSourceError::InvalidInput("missing string field query".into()))?;
        let passages = index.search(query, self.k).await?;
        tracing::debug!(tool = %name, passages = passages.len(), "retrieval");
        Ok(ToolCallContent {
            text: passages.join(PASSAGE_SEPARATOR),
        })
    }
}
