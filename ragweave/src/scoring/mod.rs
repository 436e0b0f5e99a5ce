//! Chunk scoring: per-strategy relevance scores, their weighted combination, and selection.
//!
//! - [`strategies`]: semantic judge and embedding distance scorers behind [`ChunkScorer`].
//! - [`Reranker`]: weighted average of the enabled scorers, one score per chunk.
//! - [`Selector`]: threshold / top-k filters applied in sequence.

pub mod reranker;
pub mod selector;
pub mod strategies;

pub use reranker::{weighted_average, Reranker, WEIGHT_SUM_TOLERANCE};
pub use selector::{threshold, topk, SelectionStrategy, Selector};
pub use strategies::{
    distance_score, parse_semantic_score, ChunkScorer, DistanceScorer, RerankStrategy,
    SemanticScorer,
};
