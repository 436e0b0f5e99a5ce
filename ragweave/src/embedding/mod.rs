//! Embedder trait: produces fixed-size float vectors from text.
//!
//! Used by the distance reranking strategy and by [`VectorIndex`](crate::tool_source::VectorIndex).
//! Implementations can wrap any hosted or local embedding model; [`MockEmbedder`] is a
//! deterministic stand-in for tests.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::AgentError;

/// Produces fixed-size float vectors from text.
///
/// Implementations must be `Send + Sync`; nodes share one embedder across turns.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds each text into a vector of dimension [`Embedder::dimension`].
    /// Returns one vector per input text in the same order.
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, AgentError>;

    /// Vector dimension returned by [`Embedder::embed`].
    fn dimension(&self) -> usize;
}

/// Deterministic embedder: fixed vectors for known texts, a byte histogram otherwise.
///
/// The histogram folds each byte of the lowercased text into `dimension` buckets, so texts
/// sharing vocabulary land close to each other.
pub struct MockEmbedder {
    dimension: usize,
    fixed: HashMap<String, Vec<f32>>,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            fixed: HashMap::new(),
        }
    }

    /// Pins the vector returned for `text` (builder). The vector is padded or cut to
    /// `dimension`.
    pub fn with_vector(mut self, text: impl Into<String>, mut vector: Vec<f32>) -> Self {
        vector.resize(self.dimension, 0.0);
        self.fixed.insert(text.into(), vector);
        self
    }

    fn histogram(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimension];
        for b in text.to_lowercase().bytes().filter(|b| b.is_ascii_alphanumeric()) {
            v[b as usize % self.dimension] += 1.0;
        }
        v
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, AgentError> {
        Ok(texts
            .iter()
            .map(|t| {
                self.fixed
                    .get(*t)
                    .cloned()
                    .unwrap_or_else(|| self.histogram(t))
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cosine similarity of two vectors; `0.0` when either has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Euclidean distance; extra components of the longer vector are ignored.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_embedder_is_deterministic_and_sized() {
        let e = MockEmbedder::new(8).with_vector("pinned", vec![1.0, 2.0]);
        let out = e.embed(&["pinned", "hello", "hello"]).await.unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], vec![1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(out[1], out[2]);
        assert!(out.iter().all(|v| v.len() == e.dimension()));
    }

    #[test]
    fn cosine_similarity_bounds() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn euclidean_distance_of_3_4_triangle() {
        assert_eq!(euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(euclidean_distance(&[1.5, 2.5], &[1.5, 2.5]), 0.0);
    }
}
