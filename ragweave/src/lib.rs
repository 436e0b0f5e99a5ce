//! # Ragweave
//!
//! A configurable retrieval-augmented agent built as a state graph. One [`AgentState`] flows
//! through LLM-driven nodes: history integration, query validation and transformation, a
//! retrieve-or-respond tool loop, chunk reranking and selection, answer generation and answer
//! validation. Which nodes exist is decided once from three feature flags.
//!
//! ## Main modules
//!
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], [`Next`], conditional
//!   edges, node middleware, recursion limit, DOT/text rendering.
//! - [`agent`]: RAG nodes, branch classifiers, [`Topology`], [`RagGraphBuilder`], [`RagRunner`].
//! - [`scoring`]: semantic/distance scorers, [`Reranker`], [`Selector`].
//! - [`context`]: folding selected chunks into the running context.
//! - [`state`] / [`message`]: [`AgentState`], [`Message`], [`ToolCall`].
//! - [`llm`], [`embedding`], [`tool_source`]: capability traits ([`LlmClient`], [`Embedder`],
//!   [`ToolSource`]) with mocks; [`RetrieverToolSource`] over in-memory [`VectorIndex`]es.
//! - [`timeout`]: per-call time limits for every capability.
//! - [`config`] / [`prompts`]: [`AppConfig`] and [`RagPrompts`] loaded from JSON or YAML.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! let tools = Arc::new(RetrieverToolSource::new(indexes, config.k));
//! let graph = RagGraphBuilder::new(config, llm, tools.clone())
//!     .with_topics(tools.topics())
//!     .with_embedder(embedder)
//!     .build()
//!     .await?;
//! let mut runner = RagRunner::new(graph);
//! let outcome = runner.ask("What does the second law say?").await?;
//! println!("{}", outcome.answer);
//! ```

pub mod agent;
pub mod config;
pub mod context;
pub mod embedding;
pub mod error;
pub mod graph;
pub mod llm;
pub mod message;
pub mod prompts;
pub mod scoring;
pub mod state;
pub mod timeout;
pub mod tool_source;

pub use agent::{
    build_rag_graph, BuildError, Classifiers, ConversationLog, RagGraphBuilder, RagRunner,
    Topology, TurnOutcome,
};
pub use config::AppConfig;
pub use embedding::{Embedder, MockEmbedder};
pub use error::{AgentError, ConfigError};
pub use graph::{
    generate_dot, generate_text, CompilationError, CompiledStateGraph, LoggingNodeMiddleware,
    Next, Node, NodeMiddleware, StateGraph, END, START,
};
pub use llm::{bind_tools, LlmClient, LlmResponse, MockLlm, ToolBoundLlm};
pub use message::{Message, ToolCall};
pub use prompts::{PromptTemplate, RagPrompts};
pub use scoring::{Reranker, Selector};
pub use state::AgentState;
pub use tool_source::{
    CompositeToolSource, MockToolSource, RetrieverToolSource, ToolSource, ToolSpec, VectorIndex,
};

/// Test-only: initializes tracing from `RUST_LOG` when the test binary starts, so that
/// unit tests in `src/**` can print logs with `--nocapture`.
#[cfg(test)]
mod test_logging {
    use ctor::ctor;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::Layer;

    #[ctor]
    fn init() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_filter(filter),
            )
            .try_init();
    }
}
