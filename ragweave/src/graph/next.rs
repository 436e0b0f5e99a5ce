//! Next-step result from a graph node: continue along the edge, jump to a node, or end.
//!
//! The graph runner uses this to decide the next node or to stop.

/// Next step after running a node.
///
/// - **Continue**: follow the node's outgoing edge (or its conditional router).
/// - **Node(id)**: jump to the given node.
/// - **End**: stop; return current state as final result.
///
/// Nodes with conditional edges have their `Next` ignored; the router decides.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    /// Follow the outgoing edge; if there is none, equivalent to End.
    Continue,
    /// Run the node with the given id next.
    Node(String),
    /// Stop and return the current state.
    End,
}
