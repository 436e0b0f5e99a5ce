//! Logging middleware that records node enter/exit around each node.run call.
//!
//! Attached by the RAG builder when the app config's `verbosity` is above zero.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::AgentError;
use crate::graph::Next;

use super::{NodeMiddleware, NodeRunFn};

/// Middleware that logs node enter/exit (and the last transcript entry via `Debug` of the
/// result) around each node.run call. Generic over state type `S`.
pub struct LoggingNodeMiddleware<S> {
    _phantom: std::marker::PhantomData<S>,
}

impl<S> Default for LoggingNodeMiddleware<S> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<S> NodeMiddleware<S> for LoggingNodeMiddleware<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: NodeRunFn<S>,
    ) -> Result<(S, Next), AgentError> {
        tracing::info!(node = node_id, "enter node");
        let result = inner(state).await;
        match &result {
            Ok((_, next)) => tracing::info!(node = node_id, ?next, "exit node"),
            Err(e) => tracing::warn!(node = node_id, error = %e, "exit node with error"),
        }
        result
    }
}
