pub(crate) mod build;
pub(crate) mod check;
pub(crate) mod convert;
pub(crate) mod describe;

use std::path::Path;
use std::process;

use axon_graph::Graph;

use crate::{report_error, OutputFormat};

/// Load a graph file or exit with status 1.
pub(crate) fn load_or_exit(file: &Path, output: OutputFormat, quiet: bool) -> Graph {
    match axon_graph::load_graph(file) {
        Ok(graph) => graph,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    }
}
