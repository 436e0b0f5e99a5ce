//! Weighted combination of reranking strategies.

use std::sync::Arc;

use crate::error::{AgentError, ConfigError};

use super::strategies::ChunkScorer;

/// Allowed distance of the weight sum from 1; absorbs float rounding (`0.7 + 0.2 + 0.1`).
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Elementwise `Σ weights[i] * matrix[i]`.
///
/// Fails when the weight count differs from the number of score vectors or the weights do
/// not sum to 1. The sum is compared within [`WEIGHT_SUM_TOLERANCE`], not exactly, so a
/// vector off by less than that (`[0.5, 0.5 + 1e-10]`) is accepted. Every row must have the
/// same length. A combined score that is not finite becomes `0.0`.
pub fn weighted_average(matrix: &[Vec<f64>], weights: &[f64]) -> Result<Vec<f64>, ConfigError> {
    if matrix.len() != weights.len() {
        return Err(ConfigError::WeightCountMismatch {
            strategies: matrix.len(),
            weights: weights.len(),
        });
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ConfigError::WeightsMismatch { sum });
    }
    let width = matrix.first().map_or(0, Vec::len);
    let mut out = vec![0.0; width];
    for (row, weight) in matrix.iter().zip(weights) {
        for (acc, score) in out.iter_mut().zip(row) {
            *acc += weight * score;
        }
    }
    for score in out.iter_mut().filter(|score| !score.is_finite()) {
        tracing::debug!(score = %score, "non-finite combined score, using 0");
        *score = 0.0;
    }
    Ok(out)
}

/// Scores chunks with every configured strategy and combines them by weight.
pub struct Reranker {
    scorers: Vec<Arc<dyn ChunkScorer>>,
    weights: Vec<f64>,
}

impl Reranker {
    /// Weights are only checked when [`rerank`](Self::rerank) runs.
    pub fn new(scorers: Vec<Arc<dyn ChunkScorer>>, weights: Vec<f64>) -> Self {
        Self { scorers, weights }
    }

    pub fn strategies(&self) -> Vec<&'static str> {
        self.scorers.iter().map(|s| s.strategy().as_str()).collect()
    }

    /// One combined score per chunk, index-aligned with `chunks`.
    pub async fn rerank(&self, question: &str, chunks: &[String]) -> Result<Vec<f64>, AgentError> {
        let mut matrix = Vec::with_capacity(self.scorers.len());
        for scorer in &self.scorers {
            let scores = scorer.score(question, chunks).await?;
            if scores.len() != chunks.len() {
                return Err(AgentError::InvalidState(format!(
                    "{} strategy returned {} scores for {} chunks",
                    scorer.strategy().as_str(),
                    scores.len(),
                    chunks.len()
                )));
            }
            tracing::trace!(strategy = scorer.strategy().as_str(), ?scores, "strategy scores");
            matrix.push(scores);
        }
        Ok(weighted_average(&matrix, &self.weights)?)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::scoring::RerankStrategy;

    #[test]
    fn weighted_average_is_elementwise_weighted_sum() {
        let out = weighted_average(&[vec![1.0, 0.0], vec![0.0, 1.0]], &[0.75, 0.25]).unwrap();
        assert_eq!(out, vec![0.75, 0.25]);
    }

    #[test]
    fn weights_not_summing_to_one_are_rejected() {
        let err = weighted_average(&[vec![1.0], vec![1.0]], &[0.6, 0.5]).unwrap_err();
        assert!(matches!(err, ConfigError::WeightsMismatch { .. }));
        assert!(weighted_average(&[vec![1.0], vec![1.0]], &[0.7, 0.3]).is_ok());
        assert!(weighted_average(&vec![vec![1.0]; 3], &[0.7, 0.2, 0.1]).is_ok());
    }

    #[test]
    fn weight_sum_is_compared_within_tolerance() {
        let rows = [vec![1.0], vec![1.0]];
        assert!(weighted_average(&rows, &[0.5, 0.5 + 1e-10]).is_ok());
        assert!(matches!(
            weighted_average(&rows, &[0.5, 0.5 + 1e-8]),
            Err(ConfigError::WeightsMismatch { .. })
        ));
    }

    #[test]
    fn non_finite_combined_scores_become_zero() {
        let out = weighted_average(&[vec![1e308, 0.5], vec![1e308, 0.5]], &[3.0, -2.0]).unwrap();
        assert_eq!(out, vec![0.0, 0.5]);
        let out = weighted_average(&[vec![f64::NAN, f64::INFINITY, 0.25]], &[1.0]).unwrap();
        assert_eq!(out, vec![0.0, 0.0, 0.25]);
    }

    #[test]
    fn weight_count_must_match_strategies() {
        assert_eq!(
            weighted_average(&[vec![1.0]], &[0.5, 0.5]),
            Err(ConfigError::WeightCountMismatch {
                strategies: 1,
                weights: 2
            })
        );
    }

    struct Fixed(Vec<f64>);

    #[async_trait]
    impl ChunkScorer for Fixed {
        fn strategy(&self) -> RerankStrategy {
            RerankStrategy::Semantic
        }
        async fn score(&self, _q: &str, _chunks: &[String]) -> Result<Vec<f64>, AgentError> {
            Ok(self.0.clone())
        }
    }

    fn fixed(scores: Vec<f64>) -> Arc<dyn ChunkScorer> {
        Arc::new(Fixed(scores))
    }

    #[tokio::test]
    async fn rerank_combines_scorers_and_checks_weights_at_call_time() {
        let chunks = vec!["a".to_string(), "b".to_string()];
        let ok = Reranker::new(
            vec![fixed(vec![1.0, 0.0]), fixed(vec![0.5, 0.5])],
            vec![0.5, 0.5],
        );
        assert_eq!(ok.rerank("q", &chunks).await.unwrap(), vec![0.75, 0.25]);

        let bad = Reranker::new(
            vec![fixed(vec![1.0, 0.0]), fixed(vec![0.5, 0.5])],
            vec![0.6, 0.5],
        );
        assert!(matches!(
            bad.rerank("q", &chunks).await,
            Err(AgentError::Config(ConfigError::WeightsMismatch { .. }))
        ));
    }

    #[tokio::test]
    async fn rerank_rejects_misaligned_scorer_output() {
        let r = Reranker::new(vec![fixed(vec![1.0])], vec![1.0]);
        let err = r
            .rerank("q", &["a".to_string(), "b".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidState(_)));
    }
}
