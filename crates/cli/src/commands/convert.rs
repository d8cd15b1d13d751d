use std::path::Path;
use std::process;

use axon_graph::GraphFormat;
use tracing::debug;

use super::load_or_exit;
use crate::{report_error, OutputFormat};

/// Re-encode a graph file in the format named by the output extension.
pub(crate) fn cmd_convert(input: &Path, target: &Path, output: OutputFormat, quiet: bool) {
    if input == target {
        report_error("error: input and output paths must differ", output, quiet);
        process::exit(1);
    }
    if target.extension().and_then(|e| e.to_str()) == Some("go") {
        report_error(
            "error: cannot convert to .go; use 'axon build' to generate Go source",
            output,
            quiet,
        );
        process::exit(1);
    }
    // Reject a bad target before reading anything.
    if let Err(e) = GraphFormat::from_path(target) {
        report_error(&e.to_string(), output, quiet);
        process::exit(1);
    }

    let graph = load_or_exit(input, output, quiet);
    if let Err(e) = axon_graph::save_graph(&graph, target) {
        report_error(&e.to_string(), output, quiet);
        process::exit(1);
    }
    debug!(from = %input.display(), to = %target.display(), nodes = graph.nodes.len(), "converted graph");

    if !quiet {
        match output {
            OutputFormat::Json => println!(
                "{}",
                serde_json::json!({
                    "input": input.display().to_string(),
                    "written": target.display().to_string(),
                })
            ),
            OutputFormat::Text => println!("converted {} -> {}", input.display(), target.display()),
        }
    }
}
