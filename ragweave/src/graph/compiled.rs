//! Compiled state graph: immutable, supports invoke only.
//!
//! Built by `StateGraph::compile`. Holds nodes, the entry node and the routing table derived
//! from explicit and conditional edges. One invoke is one strictly sequential walk: a single
//! active node at a time, chosen by the previous node's edge or router.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::AgentError;

use super::logging;
use super::node_middleware::NodeMiddleware;
use super::state_graph::END;
use super::{Next, NextEntry, Node};

/// Compiled graph: immutable structure, supports invoke only.
///
/// Runs from the first node; after each node, a conditional router (when present) or the
/// node's returned `Next` chooses the next node.
#[derive(Clone)]
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) node_order: Vec<String>,
    /// First node to run (from START).
    pub(super) first_node_id: String,
    /// Map from node id to how to get next: Unconditional(to_id) or Conditional(router).
    pub(super) next_map: HashMap<String, NextEntry<S>>,
    pub(super) middleware: Option<Arc<dyn NodeMiddleware<S>>>,
    pub(super) recursion_limit: usize,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Node ids in registration order.
    pub fn node_ids(&self) -> &[String] {
        &self.node_order
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn first_node_id(&self) -> &str {
        &self.first_node_id
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    /// Outgoing edges of `node_id` as `(label, target)`; the label is `None` for a plain edge.
    pub fn edges_from(&self, node_id: &str) -> Vec<(Option<String>, String)> {
        match self.next_map.get(node_id) {
            Some(NextEntry::Unconditional(to)) => vec![(None, to.clone())],
            Some(NextEntry::Conditional(router)) => router
                .branches()
                .into_iter()
                .map(|(key, to)| (Some(key), to))
                .collect(),
            None => vec![],
        }
    }

    async fn execute_node(&self, node: Arc<dyn Node<S>>, state: S) -> Result<(S, Next), AgentError> {
        match &self.middleware {
            Some(middleware) => {
                let node_id = node.id().to_string();
                middleware
                    .around_run(
                        &node_id,
                        state,
                        Box::new(move |s| Box::pin(async move { node.run(s).await })),
                    )
                    .await
            }
            None => node.run(state).await,
        }
    }

    /// Next node id, or `None` when the walk ends. A router overrides the node's `Next`.
    fn resolve_next(&self, current_id: &str, state: &S, next: Next) -> Option<String> {
        let (target, conditional) = match (self.next_map.get(current_id), next) {
            (Some(NextEntry::Conditional(router)), _) => (router.resolve_next(state), true),
            (_, Next::End) => return None,
            (_, Next::Node(id)) => (id, false),
            (Some(NextEntry::Unconditional(to)), Next::Continue) => (to.clone(), false),
            (None, Next::Continue) => return None,
        };
        logging::routed(current_id, &target, conditional);
        (target != END).then_some(target)
    }

    /// Walks the graph from the entry node until a route reaches END (or a node returns
    /// `Next::End`). Any node error aborts the walk and is returned unchanged.
    pub async fn invoke(&self, state: S) -> Result<S, AgentError> {
        logging::run_started(&self.first_node_id, self.recursion_limit);
        let mut state = state;
        let mut current_id = self.first_node_id.clone();
        let mut step = 0usize;

        loop {
            if step >= self.recursion_limit {
                let err = AgentError::RecursionLimit(self.recursion_limit);
                logging::run_failed(&current_id, step + 1, &err);
                return Err(err);
            }
            step += 1;
            let node = match self.nodes.get(&current_id) {
                Some(node) => Arc::clone(node),
                None => {
                    let err = AgentError::ExecutionFailed(format!("unknown node: {}", current_id));
                    logging::run_failed(&current_id, step, &err);
                    return Err(err);
                }
            };

            logging::node_started(&current_id, step, &state);
            let (new_state, next) = self.execute_node(node, state).await.map_err(|e| {
                logging::run_failed(&current_id, step, &e);
                e
            })?;
            logging::node_finished(&current_id, step, &next);
            state = new_state;

            match self.resolve_next(&current_id, &state, next) {
                Some(id) => current_id = id,
                None => {
                    logging::run_finished(step);
                    return Ok(state);
                }
            }
        }
    }
}
