use std::path::Path;
use std::process;

use super::load_or_exit;
use crate::{report_transpile_error, OutputFormat};

pub(crate) fn cmd_check(file: &Path, output: OutputFormat, quiet: bool) {
    let graph = load_or_exit(file, output, quiet);

    if let Err(e) = axon_core::transpile(&graph) {
        report_transpile_error(&e, output, quiet);
        process::exit(1);
    }

    if !quiet {
        match output {
            OutputFormat::Json => println!("{}", serde_json::json!({ "valid": true })),
            OutputFormat::Text => println!("valid"),
        }
    }
}
