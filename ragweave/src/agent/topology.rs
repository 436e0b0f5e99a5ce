//! Declarative graph description for the RAG agent.
//!
//! [`Topology::from_flags`] turns the three feature flags into node ids, plain edges and
//! labelled branches once. The builder instantiates and compiles whatever is listed here,
//! so the wiring can be inspected (and tested) without any capability.
//!
//! ```text
//! simple:    START → history_integration → retrieve_or_respond → tool_routing
//!            tool_routing ─retrieve→ tool_execution → extract_chunks → update_context → retrieve_or_respond
//!            tool_routing ─respond→  generate_answer → END
//! advanced:  history_integration → [validate_input ─related→] query_transform → retrieve_or_respond
//!            extract_chunks → reranking → selection → update_context
//!            generate_answer → [validate_answer →] END
//! ```

use crate::config::AppConfig;
use crate::graph::{END, START};

pub const HISTORY_INTEGRATION: &str = "history_integration";
pub const VALIDATE_INPUT: &str = "validate_input";
pub const QUERY_TRANSFORM: &str = "query_transform";
pub const RETRIEVE_OR_RESPOND: &str = "retrieve_or_respond";
pub const TOOL_ROUTING: &str = "tool_routing";
pub const TOOL_EXECUTION: &str = "tool_execution";
pub const EXTRACT_CHUNKS: &str = "extract_chunks";
pub const RERANKING: &str = "reranking";
pub const SELECTION: &str = "selection";
pub const UPDATE_CONTEXT: &str = "update_context";
pub const GENERATE_ANSWER: &str = "generate_answer";
pub const VALIDATE_ANSWER: &str = "validate_answer";

/// Feature flags that shape the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    pub advanced_rag: bool,
    pub check_input_validity: bool,
    pub check_output_validity: bool,
}

impl FeatureFlags {
    /// Input validation only takes effect with `advanced_rag`.
    pub fn validates_input(&self) -> bool {
        self.advanced_rag && self.check_input_validity
    }

    /// Output validation only takes effect with `advanced_rag`.
    pub fn validates_output(&self) -> bool {
        self.advanced_rag && self.check_output_validity
    }
}

impl From<&AppConfig> for FeatureFlags {
    fn from(config: &AppConfig) -> Self {
        Self {
            advanced_rag: config.advanced_rag,
            check_input_validity: config.check_input_validity,
            check_output_validity: config.check_output_validity,
        }
    }
}

/// Routing rule attached to a branching node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Router {
    /// Relevance of the validation message: `related` / `unrelated`.
    Relevance,
    /// Pending tool calls on the latest message: `retrieve` / `respond`.
    ToolCondition,
}

/// One edge of the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeSpec {
    Plain {
        from: &'static str,
        to: &'static str,
    },
    Branch {
        from: &'static str,
        router: Router,
        /// `(label, target)` pairs.
        branches: Vec<(&'static str, &'static str)>,
    },
}

/// Nodes and edges of the RAG graph for one flag combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    pub flags: FeatureFlags,
    pub nodes: Vec<&'static str>,
    pub edges: Vec<EdgeSpec>,
}

fn plain(from: &'static str, to: &'static str) -> EdgeSpec {
    EdgeSpec::Plain { from, to }
}

impl Topology {
    pub fn from_flags(flags: FeatureFlags) -> Self {
        let mut nodes = vec![HISTORY_INTEGRATION];
        let mut edges = vec![plain(START, HISTORY_INTEGRATION)];

        if flags.advanced_rag {
            if flags.validates_input() {
                nodes.push(VALIDATE_INPUT);
                edges.push(plain(HISTORY_INTEGRATION, VALIDATE_INPUT));
                edges.push(EdgeSpec::Branch {
                    from: VALIDATE_INPUT,
                    router: Router::Relevance,
                    branches: vec![("related", QUERY_TRANSFORM), ("unrelated", END)],
                });
            } else {
                edges.push(plain(HISTORY_INTEGRATION, QUERY_TRANSFORM));
            }
            nodes.push(QUERY_TRANSFORM);
            edges.push(plain(QUERY_TRANSFORM, RETRIEVE_OR_RESPOND));
        } else {
            edges.push(plain(HISTORY_INTEGRATION, RETRIEVE_OR_RESPOND));
        }

        nodes.extend([RETRIEVE_OR_RESPOND, TOOL_ROUTING, TOOL_EXECUTION, EXTRACT_CHUNKS]);
        edges.push(plain(RETRIEVE_OR_RESPOND, TOOL_ROUTING));
        edges.push(EdgeSpec::Branch {
            from: TOOL_ROUTING,
            router: Router::ToolCondition,
            branches: vec![("retrieve", TOOL_EXECUTION), ("respond", GENERATE_ANSWER)],
        });
        edges.push(plain(TOOL_EXECUTION, EXTRACT_CHUNKS));

        if flags.advanced_rag {
            nodes.extend([RERANKING, SELECTION]);
            edges.push(plain(EXTRACT_CHUNKS, RERANKING));
            edges.push(plain(RERANKING, SELECTION));
            edges.push(plain(SELECTION, UPDATE_CONTEXT));
        } else {
            edges.push(plain(EXTRACT_CHUNKS, UPDATE_CONTEXT));
        }
        nodes.extend([UPDATE_CONTEXT, GENERATE_ANSWER]);
        edges.push(plain(UPDATE_CONTEXT, RETRIEVE_OR_RESPOND));

        if flags.validates_output() {
            nodes.push(VALIDATE_ANSWER);
            edges.push(plain(GENERATE_ANSWER, VALIDATE_ANSWER));
            edges.push(plain(VALIDATE_ANSWER, END));
        } else {
            edges.push(plain(GENERATE_ANSWER, END));
        }

        Self {
            flags,
            nodes,
            edges,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::from_flags(config.into())
    }

    pub fn contains(&self, node: &str) -> bool {
        self.nodes.iter().any(|n| *n == node)
    }

    /// Targets reachable in one step from `node`, in edge order.
    pub fn successors(&self, node: &str) -> Vec<&'static str> {
        self.edges
            .iter()
            .flat_map(|edge| match edge {
                EdgeSpec::Plain { from, to } if *from == node => vec![*to],
                EdgeSpec::Branch { from, branches, .. } if *from == node => {
                    branches.iter().map(|(_, to)| *to).collect()
                }
                _ => vec![],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(advanced_rag: bool, input: bool, output: bool) -> FeatureFlags {
        FeatureFlags {
            advanced_rag,
            check_input_validity: input,
            check_output_validity: output,
        }
    }

    #[test]
    fn simple_rag_skips_advanced_nodes_even_with_checks_enabled() {
        let t = Topology::from_flags(flags(false, true, true));
        for skipped in [VALIDATE_INPUT, QUERY_TRANSFORM, RERANKING, SELECTION, VALIDATE_ANSWER] {
            assert!(!t.contains(skipped), "{} should be absent", skipped);
        }
        assert_eq!(t.successors(HISTORY_INTEGRATION), vec![RETRIEVE_OR_RESPOND]);
        assert_eq!(t.successors(EXTRACT_CHUNKS), vec![UPDATE_CONTEXT]);
        assert_eq!(t.successors(UPDATE_CONTEXT), vec![RETRIEVE_OR_RESPOND]);
        assert_eq!(t.successors(GENERATE_ANSWER), vec![END]);
        assert_eq!(
            t.successors(TOOL_ROUTING),
            vec![TOOL_EXECUTION, GENERATE_ANSWER]
        );
    }

    #[test]
    fn advanced_rag_with_all_checks() {
        let t = Topology::from_flags(flags(true, true, true));
        assert_eq!(t.nodes.len(), 12);
        assert_eq!(t.successors(HISTORY_INTEGRATION), vec![VALIDATE_INPUT]);
        assert_eq!(t.successors(VALIDATE_INPUT), vec![QUERY_TRANSFORM, END]);
        assert_eq!(t.successors(EXTRACT_CHUNKS), vec![RERANKING]);
        assert_eq!(t.successors(SELECTION), vec![UPDATE_CONTEXT]);
        assert_eq!(t.successors(GENERATE_ANSWER), vec![VALIDATE_ANSWER]);
        assert_eq!(t.successors(VALIDATE_ANSWER), vec![END]);
    }

    #[test]
    fn advanced_rag_without_checks() {
        let t = Topology::from_flags(flags(true, false, false));
        assert!(!t.contains(VALIDATE_INPUT));
        assert!(!t.contains(VALIDATE_ANSWER));
        assert_eq!(t.successors(HISTORY_INTEGRATION), vec![QUERY_TRANSFORM]);
        assert_eq!(t.successors(GENERATE_ANSWER), vec![END]);
    }

    #[test]
    fn every_edge_endpoint_is_a_listed_node() {
        for advanced in [false, true] {
            for input in [false, true] {
                for output in [false, true] {
                    let t = Topology::from_flags(flags(advanced, input, output));
                    for edge in &t.edges {
                        let (from, targets) = match edge {
                            EdgeSpec::Plain { from, to } => (*from, vec![*to]),
                            EdgeSpec::Branch { from, branches, .. } => {
                                (*from, branches.iter().map(|(_, to)| *to).collect())
                            }
                        };
                        assert!(from == START || t.contains(from), "{}", from);
                        for to in targets {
                            assert!(to == END || t.contains(to), "{}", to);
                        }
                    }
                }
            }
        }
    }
}
