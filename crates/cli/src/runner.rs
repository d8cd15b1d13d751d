//! Conformance suite runner.
//!
//! Convention:
//!   positive/  -- *.ax + *.expected.go          (transpiles to exactly this text)
//!   negative/  -- *.ax + *.expected-error.json  (fails with exactly this error)

use crate::tap::TapReport;
use axon_graph::load_graph;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};

pub struct RunResult {
    pub failed: usize,
}

/// Run every fixture and write the TAP report to stdout.
pub fn run_suite(suite_dir: &Path, quiet: bool) -> io::Result<RunResult> {
    let mut tap = TapReport::new();

    run_positive_dir(suite_dir, &mut tap);
    run_negative_dir(suite_dir, &mut tap);

    tap.write_to(&mut io::stdout().lock(), quiet)?;
    Ok(RunResult {
        failed: tap.failure_count(),
    })
}

fn run_positive_dir(suite_dir: &Path, tap: &mut TapReport) {
    let dir = suite_dir.join("positive");
    for graph_path in glob_graph_files(&dir) {
        let name = format!("positive/{}", stem(&graph_path));
        let expected_path = dir.join(format!("{}.expected.go", stem(&graph_path)));
        let expected = match std::fs::read_to_string(&expected_path) {
            Ok(text) => text,
            Err(e) => {
                tap.fail(
                    &name,
                    format!("cannot read expected file {}: {}", expected_path.display(), e),
                );
                continue;
            }
        };

        let graph = match load_graph(&graph_path) {
            Ok(g) => g,
            Err(e) => {
                tap.fail(&name, e.to_string());
                continue;
            }
        };

        match axon_core::transpile(&graph) {
            Ok(got) if got == expected => tap.pass(&name),
            Ok(got) => tap.fail_with_detail(
                &name,
                format!("output differs at line {}", first_difference(&expected, &got)),
                expected_got(&expected, &got),
            ),
            Err(e) => tap.fail(&name, format!("unexpected transpile error: {}", e)),
        }
    }
}

fn run_negative_dir(suite_dir: &Path, tap: &mut TapReport) {
    let dir = suite_dir.join("negative");
    for graph_path in glob_graph_files(&dir) {
        let name = format!("negative/{}", stem(&graph_path));
        let expected_path = dir.join(format!("{}.expected-error.json", stem(&graph_path)));
        let expected = match read_json(&expected_path) {
            Ok(v) => v,
            Err(e) => {
                tap.fail(&name, format!("failed to read expected-error file: {}", e));
                continue;
            }
        };

        let graph = match load_graph(&graph_path) {
            Ok(g) => g,
            Err(e) => {
                tap.fail(&name, e.to_string());
                continue;
            }
        };

        match axon_core::transpile(&graph) {
            Err(e) => {
                let got = e.to_json_value();
                if got == expected {
                    tap.pass(&name);
                } else {
                    tap.fail_with_detail(&name, "error JSON differs", json_diff(&expected, &got));
                }
            }
            Ok(_) => tap.fail(&name, "expected a transpile error but transpiling succeeded"),
        }
    }
}

// -- Helpers --

fn glob_graph_files(dir: &Path) -> Vec<PathBuf> {
    let mut results = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("ax") {
                results.push(path);
            }
        }
    }
    results.sort();
    results
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

fn read_json(path: &Path) -> Result<Value, String> {
    let src = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    serde_json::from_str(&src).map_err(|e| format!("invalid JSON in {}: {}", path.display(), e))
}

fn json_diff(expected: &Value, got: &Value) -> String {
    let exp_str = serde_json::to_string_pretty(expected).unwrap_or_default();
    let got_str = serde_json::to_string_pretty(got).unwrap_or_default();
    format!("--- expected\n{}\n+++ got\n{}", exp_str, got_str)
}

/// One-based number of the first line where the two texts diverge.
fn first_difference(expected: &str, got: &str) -> usize {
    expected
        .lines()
        .zip(got.lines())
        .position(|(e, g)| e != g)
        .unwrap_or_else(|| expected.lines().count().min(got.lines().count()))
        + 1
}

fn expected_got(expected: &str, got: &str) -> String {
    format!("--- expected\n{}\n+++ got\n{}", expected, got)
}
