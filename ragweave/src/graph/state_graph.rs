//! Graph builder: register nodes, wire plain edges and conditional branches, then compile.
//!
//! `START` and `END` are sentinels usable as edge endpoints only. Each node leaves through
//! exactly one plain edge or one conditional branch. Loops are allowed as long as a branch
//! can leave them (the RAG tool loop `update_context → retrieve_or_respond` is one); the
//! recursion limit bounds them at run time.
//!
//! ```rust,ignore
//! let mut graph = StateGraph::<AgentState>::new();
//! graph
//!     .add_node("history_integration", history)
//!     .add_node("generate_answer", answer)
//!     .add_edge(START, "history_integration")
//!     .add_edge("history_integration", "generate_answer")
//!     .add_edge("generate_answer", END);
//! let compiled = graph.compile()?;
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::CompiledStateGraph;
use crate::graph::conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
use crate::graph::node::Node;
use crate::graph::node_middleware::NodeMiddleware;

/// Entry sentinel: `add_edge(START, first)`.
pub const START: &str = "__start__";

/// Exit sentinel: `add_edge(last, END)` or a branch target.
pub const END: &str = "__end__";

/// Node executions allowed per invoke unless `with_recursion_limit` says otherwise.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// Mutable graph description; `compile` validates it into a [`CompiledStateGraph`].
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Registration order; keeps rendering deterministic.
    node_order: Vec<String>,
    edges: Vec<(String, String)>,
    branches: HashMap<String, ConditionalRouter<S>>,
    middleware: Option<Arc<dyn NodeMiddleware<S>>>,
    recursion_limit: usize,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            node_order: Vec::new(),
            edges: Vec::new(),
            branches: HashMap::new(),
            middleware: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// Wraps every node run of the compiled graph with `middleware`.
    pub fn with_middleware(self, middleware: Arc<dyn NodeMiddleware<S>>) -> Self {
        Self {
            middleware: Some(middleware),
            ..self
        }
    }

    /// Maximum node executions per invoke before the run fails with
    /// [`AgentError::RecursionLimit`](crate::error::AgentError::RecursionLimit).
    pub fn with_recursion_limit(self, recursion_limit: usize) -> Self {
        Self {
            recursion_limit,
            ..self
        }
    }

    /// Registers `node` under `id`; a second registration with the same id replaces it.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        let id = id.into();
        if self.nodes.insert(id.clone(), node).is_none() {
            self.node_order.push(id);
        }
        self
    }

    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Routes out of `source` by `path(state)`.
    ///
    /// With a `path_map` the returned key is looked up there (falling back to the key
    /// itself); without one the key is the next node id or `END`.
    ///
    /// ```rust,ignore
    /// graph.add_conditional_edges(
    ///     "tool_routing",
    ///     Arc::new(|s: &AgentState| tool_condition(s).as_str().to_string()),
    ///     Some([("retrieve".into(), "tool_execution".into()),
    ///           ("respond".into(), "generate_answer".into())].into_iter().collect()),
    /// );
    /// ```
    pub fn add_conditional_edges(
        &mut self,
        source: impl Into<String>,
        path: ConditionalRouterFn<S>,
        path_map: Option<HashMap<String, String>>,
    ) -> &mut Self {
        self.branches
            .insert(source.into(), ConditionalRouter::new(path, path_map));
        self
    }

    fn is_node_or(&self, id: &str, sentinel: &str) -> bool {
        id == sentinel || self.nodes.contains_key(id)
    }

    fn check_endpoints(&self) -> Result<(), CompilationError> {
        for (from, to) in &self.edges {
            if !self.is_node_or(from, START) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if !self.is_node_or(to, END) {
                return Err(CompilationError::NodeNotFound(to.clone()));
            }
        }
        for (source, router) in &self.branches {
            if !self.nodes.contains_key(source) {
                return Err(CompilationError::NodeNotFound(source.clone()));
            }
            for (label, target) in router.branches() {
                if !self.is_node_or(&target, END) {
                    return Err(CompilationError::UnknownBranchTarget {
                        source_node: source.clone(),
                        label,
                        target,
                    });
                }
            }
        }
        Ok(())
    }

    fn entry(&self) -> Result<String, CompilationError> {
        let entries: Vec<&String> = self
            .edges
            .iter()
            .filter(|(from, _)| from == START)
            .map(|(_, to)| to)
            .collect();
        match entries.as_slice() {
            [] => Err(CompilationError::MissingStart),
            [only] => Ok((*only).clone()),
            many => Err(CompilationError::AmbiguousStart(many.len())),
        }
    }

    /// A router without a path map may return END, so it counts as an exit.
    fn reaches_end(&self) -> bool {
        self.edges.iter().any(|(_, to)| to == END)
            || self.branches.values().any(|router| {
                router
                    .path_map
                    .as_ref()
                    .map_or(true, |map| map.values().any(|to| to == END))
            })
    }

    fn routing_table(&self) -> Result<HashMap<String, NextEntry<S>>, CompilationError> {
        let mut table = HashMap::new();
        for (from, to) in self.edges.iter().filter(|(from, _)| from != START) {
            if table
                .insert(from.clone(), NextEntry::Unconditional(to.clone()))
                .is_some()
            {
                return Err(CompilationError::DuplicateEdge(from.clone()));
            }
        }
        for (source, router) in &self.branches {
            if table
                .insert(source.clone(), NextEntry::Conditional(router.clone()))
                .is_some()
            {
                return Err(CompilationError::MixedRouting(source.clone()));
            }
        }
        Ok(table)
    }

    /// Without any branch, following plain edges from the entry must reach END.
    fn check_plain_cycle(
        &self,
        entry: &str,
        table: &HashMap<String, NextEntry<S>>,
    ) -> Result<(), CompilationError> {
        if !self.branches.is_empty() {
            return Ok(());
        }
        let mut seen = HashSet::from([entry.to_string()]);
        let mut current = entry;
        while let Some(NextEntry::Unconditional(next)) = table.get(current) {
            if next == END {
                break;
            }
            if !seen.insert(next.clone()) {
                return Err(CompilationError::UnconditionalCycle(next.clone()));
            }
            current = next;
        }
        Ok(())
    }

    /// Validates the description and freezes it.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.check_endpoints()?;
        let entry = self.entry()?;
        if !self.reaches_end() {
            return Err(CompilationError::MissingEnd);
        }
        let next_map = self.routing_table()?;
        self.check_plain_cycle(&entry, &next_map)?;

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            node_order: self.node_order,
            first_node_id: entry,
            next_map,
            middleware: self.middleware,
            recursion_limit: self.recursion_limit,
        })
    }
}
