//! Chunk selection: strategies applied in order, each replacing the `(chunks, scores)` pair.

use crate::config::SelectionOptions;
use crate::error::ConfigError;

/// Keeps chunk `i` iff `scores[i] >= min`, preserving order.
pub fn threshold(chunks: Vec<String>, scores: Vec<f64>, min: f64) -> (Vec<String>, Vec<f64>) {
    chunks
        .into_iter()
        .zip(scores)
        .filter(|(_, score)| *score >= min)
        .unzip()
}

/// NaN ranks below every number.
fn rank_key(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score
    }
}

/// Sorts by descending score and keeps the first `k`. Equal scores keep their input order;
/// NaN scores go last.
pub fn topk(chunks: Vec<String>, scores: Vec<f64>, k: usize) -> (Vec<String>, Vec<f64>) {
    let mut pairs: Vec<(String, f64)> = chunks.into_iter().zip(scores).collect();
    pairs.sort_by(|a, b| rank_key(b.1).total_cmp(&rank_key(a.1)));
    pairs.truncate(k);
    pairs.into_iter().unzip()
}

/// A configured selection strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionStrategy {
    Threshold { min: f64 },
    TopK { k: usize },
}

impl SelectionStrategy {
    /// Resolves `name` and its required option from `options`.
    pub fn from_config(name: &str, options: &SelectionOptions) -> Result<Self, ConfigError> {
        match name {
            "threshold" => {
                let block = options
                    .threshold
                    .as_ref()
                    .ok_or_else(|| ConfigError::MissingOptions(name.to_string()))?;
                let min = block.min.ok_or_else(|| ConfigError::MissingOption {
                    strategy: name.to_string(),
                    option: "min".to_string(),
                })?;
                Ok(Self::Threshold { min })
            }
            "topk" => {
                let block = options
                    .topk
                    .as_ref()
                    .ok_or_else(|| ConfigError::MissingOptions(name.to_string()))?;
                let k = block.k.ok_or_else(|| ConfigError::MissingOption {
                    strategy: name.to_string(),
                    option: "k".to_string(),
                })?;
                Ok(Self::TopK { k })
            }
            other => Err(ConfigError::UnsupportedStrategy {
                kind: "selection",
                name: other.to_string(),
            }),
        }
    }

    pub fn apply(&self, chunks: Vec<String>, scores: Vec<f64>) -> (Vec<String>, Vec<f64>) {
        match self {
            Self::Threshold { min } => threshold(chunks, scores, *min),
            Self::TopK { k } => topk(chunks, scores, *k),
        }
    }
}

/// Ordered selection strategies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    strategies: Vec<SelectionStrategy>,
}

impl Selector {
    pub fn new(strategies: Vec<SelectionStrategy>) -> Self {
        Self { strategies }
    }

    /// Parses every name in `names` against `options`; the first bad one fails.
    pub fn from_config(names: &[String], options: &SelectionOptions) -> Result<Self, ConfigError> {
        names
            .iter()
            .map(|name| SelectionStrategy::from_config(name, options))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    pub fn strategies(&self) -> &[SelectionStrategy] {
        &self.strategies
    }

    pub fn select(&self, chunks: Vec<String>, scores: Vec<f64>) -> (Vec<String>, Vec<f64>) {
        self.strategies
            .iter()
            .fold((chunks, scores), |(c, s), strategy| strategy.apply(c, s))
    }
}
