//! Why `StateGraph::compile` rejected a topology.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompilationError {
    /// An edge endpoint or branch source is neither a registered node nor START/END.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("graph has no edge from START")]
    MissingStart,

    /// More than one edge leaves START; entry must be a single node.
    #[error("graph has {0} edges from START, expected exactly one")]
    AmbiguousStart(usize),

    /// No plain edge or branch can reach END.
    #[error("graph has no path to END")]
    MissingEnd,

    /// Two plain edges leave the same node.
    #[error("node {0} has more than one outgoing edge")]
    DuplicateEdge(String),

    /// A node has both a plain outgoing edge and a conditional branch.
    #[error("node {0} has both an outgoing edge and conditional edges")]
    MixedRouting(String),

    /// A branch label maps to a node that does not exist.
    #[error("branch {label:?} of {source_node} targets unknown node {target}")]
    UnknownBranchTarget {
        source_node: String,
        label: String,
        target: String,
    },

    /// Plain edges loop back without any router to break the cycle.
    #[error("plain edges form a cycle through {0}")]
    UnconditionalCycle(String),
}
