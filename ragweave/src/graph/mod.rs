//! State graph: nodes + edges + conditional edges, compile and invoke.
//!
//! StateGraph: add nodes and edges, compile, then invoke with state. The RAG agent's
//! topology is assembled from a declarative description in
//! [`agent::topology`](crate::agent::topology) and compiled here.

mod compile_error;
mod compiled;
mod conditional;
pub mod logging;
mod logging_middleware;
mod next;
mod node;
mod node_middleware;
mod state_graph;
mod visualization;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
pub use logging_middleware::LoggingNodeMiddleware;
pub use next::Next;
pub use node::Node;
pub use node_middleware::{NodeMiddleware, NodeRunFn};
pub use state_graph::{StateGraph, DEFAULT_RECURSION_LIMIT, END, START};
pub use visualization::{generate_dot, generate_text};
