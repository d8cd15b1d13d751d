use std::path::Path;

use super::load_or_exit;
use crate::OutputFormat;

pub(crate) fn cmd_describe(file: &Path, output: OutputFormat, quiet: bool) {
    let graph = load_or_exit(file, output, quiet);

    match output {
        OutputFormat::Text => print!("{}", axon_graph::describe_graph(&graph)),
        OutputFormat::Json => {
            let nodes: Vec<serde_json::Value> = graph
                .nodes
                .iter()
                .map(|node| {
                    serde_json::json!({
                        "id": node.id,
                        "description": axon_graph::describe_node(&graph, node),
                    })
                })
                .collect();
            let doc = serde_json::json!({
                "id": graph.id,
                "name": graph.name,
                "nodes": nodes,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&doc).unwrap_or_else(|e| format!("serialization error: {}", e))
            );
        }
    }
}
