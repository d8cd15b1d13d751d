//! Human-readable summaries of graph nodes.
//!
//! Used by `axon describe` to explain what a graph does without opening an
//! editor.

use crate::types::{Graph, Node, NodeType};
use std::collections::HashMap;

/// Describe one node: identity, role, attached notes, wired inputs and
/// execution successors.
pub fn describe_node(graph: &Graph, node: &Node) -> String {
    let labels: HashMap<&str, &str> = graph
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), n.label.as_str()))
        .collect();
    describe_with_labels(graph, node, &labels)
}

fn describe_with_labels(graph: &Graph, node: &Node, labels: &HashMap<&str, &str>) -> String {
    let mut lines = vec![
        format!("Node: {} ({})", node.label, node.id),
        format!("Type: {}", node.node_type),
    ];

    match node.node_type {
        NodeType::Constant => lines.push(format!(
            "Provides the static value: {}",
            node.config_value("value").unwrap_or("<missing>")
        )),
        NodeType::Function => lines.push(format!("Calls function: {}", node.impl_reference)),
        NodeType::Operator => lines.push(format!(
            "Performs operation: {}",
            node.config_value("op").unwrap_or("<missing>")
        )),
        NodeType::Start => lines.push("Entry point for an execution path.".to_string()),
        NodeType::End => lines.push("Termination point for an execution path.".to_string()),
        NodeType::Ignore => {
            lines.push("Explicitly discards any value connected to its input.".to_string())
        }
        NodeType::Return => lines.push("Returns its inputs to the caller.".to_string()),
        NodeType::StructDef => lines.push(format!("Declares a struct with {} field(s).", node.inputs.len())),
        NodeType::FuncDef => lines.push(format!(
            "Declares a function with {} parameter(s).",
            node.outputs.len()
        )),
    }

    for id in &node.comment_ids {
        if let Some(comment) = graph.comment(id) {
            for line in comment.content.trim().lines().filter(|l| !l.trim().is_empty()) {
                lines.push(format!(" - Note: {}", line.trim()));
            }
        }
    }

    for port in &node.inputs {
        if let Some(edge) = graph
            .data_edges
            .iter()
            .find(|e| e.to_node_id == node.id && e.to_port == port.name)
        {
            let source = labels
                .get(edge.from_node_id.as_str())
                .copied()
                .unwrap_or(edge.from_node_id.as_str());
            lines.push(format!(
                " - Input '{}' receives data from '{}.{}'",
                port.name, source, edge.from_port
            ));
        }
    }

    for edge in graph.exec_edges.iter().filter(|e| e.from_node_id == node.id) {
        let target = labels
            .get(edge.to_node_id.as_str())
            .copied()
            .unwrap_or(edge.to_node_id.as_str());
        lines.push(format!(" - After this, execution flows to: '{}'", target));
    }

    lines.join("\n")
}

/// Describe every node of the graph, in declaration order.
pub fn describe_graph(graph: &Graph) -> String {
    let labels: HashMap<&str, &str> = graph
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), n.label.as_str()))
        .collect();

    let mut out = format!("Axon Graph | Name: {} | ID: {}\n", graph.name, graph.id);
    for node in &graph.nodes {
        out.push('\n');
        out.push_str(&describe_with_labels(graph, node, &labels));
        out.push('\n');
    }
    out
}
