//! `tracing` events emitted by the compiled graph while it walks the topology.
//!
//! Every event carries the node id and the 1-based step number, so one turn can be read back
//! as a sequence: `run started` → `node started`/`node finished` per step → `run finished` or
//! `run failed`.

use std::fmt::Debug;

use crate::error::AgentError;

use super::Next;

pub fn run_started(entry: &str, recursion_limit: usize) {
    tracing::info!(entry, recursion_limit, "run started");
}

/// Node about to run; the incoming state is only rendered at `trace` level.
pub fn node_started<S: Debug>(node_id: &str, step: usize, state: &S) {
    tracing::debug!(node_id, step, "node started");
    tracing::trace!(node_id, step, state = ?state, "node input");
}

pub fn node_finished(node_id: &str, step: usize, next: &Next) {
    tracing::debug!(node_id, step, ?next, "node finished");
}

/// Which node the walk moves to, and whether a router picked it.
pub fn routed(from: &str, to: &str, conditional: bool) {
    tracing::debug!(from, to, conditional, "routed");
}

pub fn run_finished(steps: usize) {
    tracing::info!(steps, "run finished");
}

pub fn run_failed(node_id: &str, step: usize, error: &AgentError) {
    tracing::error!(node_id, step, %error, "run failed");
}
