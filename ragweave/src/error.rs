//! Agent execution and configuration error types.
//!
//! `AgentError` is returned by every node and by `CompiledStateGraph::invoke`; a turn that
//! returns an error is aborted as a whole. `ConfigError` covers misconfiguration, raised at
//! build time when structural (strategy choice, missing prompt) and at call time when it
//! depends on runtime data (reranking weights).

use std::time::Duration;

use thiserror::Error;

/// Misconfiguration of a node, strategy, or prompt. Always fatal for the turn.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// Strategy name not implemented for the given kind (query transform, reranking, selection).
    #[error("{kind} strategy {name} is not supported")]
    UnsupportedStrategy { kind: &'static str, name: String },

    /// Options block for a strategy is absent.
    #[error("{0} options not found")]
    MissingOptions(String),

    /// A required field is missing from a strategy's options.
    #[error("{option} field not found in {strategy} options")]
    MissingOption { strategy: String, option: String },

    /// A prompt template needed by an enabled node is absent.
    #[error("prompt not found: {0}")]
    MissingPrompt(String),

    /// A strategy needs a capability (judge LLM, embedder) that was not provided.
    #[error("{strategy} strategy requires a {capability}")]
    MissingCapability {
        strategy: String,
        capability: &'static str,
    },

    /// Reranking weights do not sum to 1.
    #[error("reranking weights must sum to 1 (got {sum})")]
    WeightsMismatch { sum: f64 },

    /// One weight per reranking strategy is required.
    #[error("{strategies} reranking strategies but {weights} weights")]
    WeightCountMismatch { strategies: usize, weights: usize },

    /// Config or prompts file could not be read, parsed, or rendered.
    #[error("config load: {0}")]
    Load(String),
}

/// Agent execution error.
///
/// Capability failures (LLM, embedder, tool) are not retried by the core; they propagate to
/// the caller of the graph run.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed with a message.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// Fatal configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An external capability (chat model, embedder, tool) returned an error.
    #[error("{capability} failed: {message}")]
    Capability {
        capability: &'static str,
        message: String,
    },

    /// An external capability did not answer within the configured limit.
    #[error("{capability} timed out after {limit:?}")]
    Timeout {
        capability: &'static str,
        limit: Duration,
    },

    /// The graph executed more steps than its recursion limit allows.
    #[error("recursion limit of {0} steps reached without hitting END")]
    RecursionLimit(usize),

    /// A node found the state in a shape it cannot work with.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl AgentError {
    /// Shorthand for a failed chat model call.
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Capability {
            capability: "llm",
            message: message.into(),
        }
    }

    /// Shorthand for a failed embedding call.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Capability {
            capability: "embedding",
            message: message.into(),
        }
    }
}
