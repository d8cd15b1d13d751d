use std::fs;
use std::path::Path;
use std::process;

use axon_core::{transpile_with, TranspileConfig};
use tracing::debug;

use super::load_or_exit;
use crate::{report_error, report_transpile_error, OutputFormat};

pub(crate) fn cmd_build(file: &Path, out_dir: &Path, package: &str, output: OutputFormat, quiet: bool) {
    let graph = load_or_exit(file, output, quiet);

    let config = TranspileConfig {
        package_name: package.to_string(),
        ..TranspileConfig::default()
    };
    let source = match transpile_with(&graph, &config) {
        Ok(source) => source,
        Err(e) => {
            report_transpile_error(&e, output, quiet);
            process::exit(1);
        }
    };

    if let Err(e) = fs::create_dir_all(out_dir) {
        report_error(
            &format!("error creating '{}': {}", out_dir.display(), e),
            output,
            quiet,
        );
        process::exit(1);
    }
    let target = out_dir.join("main.go");
    if let Err(e) = fs::write(&target, &source) {
        report_error(
            &format!("error writing '{}': {}", target.display(), e),
            output,
            quiet,
        );
        process::exit(1);
    }
    debug!(path = %target.display(), bytes = source.len(), "wrote generated source");

    if !quiet {
        match output {
            OutputFormat::Json => println!("{}", serde_json::json!({ "written": target.display().to_string() })),
            OutputFormat::Text => println!("wrote {}", target.display()),
        }
    }
}
