//! The RAG agent: classifiers, nodes, declarative topology, builder and turn runner.
//!
//! [`RagGraphBuilder`] reads [`AppConfig`](crate::config::AppConfig) and
//! [`RagPrompts`](crate::prompts::RagPrompts), derives a [`Topology`] from the feature flags,
//! instantiates one node per step and compiles a `CompiledStateGraph<AgentState>`.
//! [`RagRunner`] drives it one turn at a time.

pub mod classify;
pub mod nodes;
pub mod topology;

mod builder;
mod runner;

pub use builder::{build_rag_graph, BuildError, RagGraphBuilder};
pub use classify::{
    is_related, tool_condition, AnswerVerdict, Classifiers, Decision, KeywordClassifier,
    MessageClassifier, Relevance, ToolRoute,
};
pub use runner::{ConversationLog, LogEntry, RagRunner, Role, TurnOutcome};
pub use topology::{EdgeSpec, FeatureFlags, Router, Topology};
