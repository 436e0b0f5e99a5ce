//! Graph visualization utilities.
//!
//! Exports the compiled topology (plain edges and labelled conditional branches) to Graphviz
//! DOT or to a plain text listing.

use std::fmt::{Debug, Write};

use super::CompiledStateGraph;
use super::{END, START};

/// Generate Graphviz DOT format representation of the graph.
///
/// Conditional branches are drawn dashed and labelled with their routing key.
pub fn generate_dot<S>(graph: &CompiledStateGraph<S>) -> String
where
    S: Clone + Send + Sync + Debug + 'static,
{
    let mut dot = String::from("digraph {\n");
    dot.push_str("  rankdir=TB;\n");
    dot.push_str("  node [shape=box];\n\n");
    let _ = writeln!(
        dot,
        "  \"{}\" [label=\"START\", style=bold, fillcolor=lightgreen];",
        START
    );
    let _ = writeln!(
        dot,
        "  \"{}\" [label=\"END\", style=bold, fillcolor=lightcoral];",
        END
    );
    for node_id in graph.node_ids() {
        let _ = writeln!(dot, "  \"{}\";", node_id);
    }
    dot.push('\n');

    let _ = writeln!(dot, "  \"{}\" -> \"{}\";", START, graph.first_node_id());
    for node_id in graph.node_ids() {
        for (label, to) in graph.edges_from(node_id) {
            match label {
                Some(label) => {
                    let _ = writeln!(
                        dot,
                        "  \"{}\" -> \"{}\" [label=\"{}\", style=dashed];",
                        node_id, to, label
                    );
                }
                None => {
                    let _ = writeln!(dot, "  \"{}\" -> \"{}\";", node_id, to);
                }
            }
        }
    }

    dot.push_str("}\n");
    dot
}

/// Generate a simple text representation of the graph structure.
pub fn generate_text<S>(graph: &CompiledStateGraph<S>) -> String
where
    S: Clone + Send + Sync + Debug + 'static,
{
    let mut text = String::new();
    let _ = writeln!(text, "Graph Structure:");
    let _ = writeln!(text, "Nodes: {}", graph.node_ids().len());
    let _ = writeln!(text, "\nEdges:");
    let _ = writeln!(text, "  {} -> {}", START, graph.first_node_id());
    for node_id in graph.node_ids() {
        for (label, to) in graph.edges_from(node_id) {
            match label {
                Some(label) => {
                    let _ = writeln!(text, "  {} -[{}]-> {}", node_id, label, to);
                }
                None => {
                    let _ = writeln!(text, "  {} -> {}", node_id, to);
                }
            }
        }
    }
    text
}
