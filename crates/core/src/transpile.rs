//! Four-pass transpiler: Axon graph -> Go source.
//!
//! A thin orchestrator that runs each pass in order and assembles the file.

use crate::error::TranspileError;
use crate::pass1_index;
use crate::pass2_scope;
use crate::pass3_schedule;
use crate::pass4_codegen::Generator;
use axon_graph::{Graph, NodeType};
use tracing::info;

/// Output options for one transpile call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileConfig {
    /// Go package clause of the generated file.
    pub package_name: String,
    /// Name of the function wrapping the main flow.
    pub entry_function: String,
}

impl Default for TranspileConfig {
    fn default() -> Self {
        TranspileConfig {
            package_name: "main".to_string(),
            entry_function: "main".to_string(),
        }
    }
}

/// Transpile `graph` into a Go source file with default options.
pub fn transpile(graph: &Graph) -> Result<String, TranspileError> {
    transpile_with(graph, &TranspileConfig::default())
}

/// Transpile `graph` into a Go source file. On error nothing is returned
/// but the error.
pub fn transpile_with(graph: &Graph, config: &TranspileConfig) -> Result<String, TranspileError> {
    // Pass 1: lookups and edge validation
    let index = pass1_index::build_index(graph)?;

    // Pass 2: flows and globals
    let scopes = pass2_scope::resolve_scopes(&index)?;

    let mut generator = Generator::new(&index);
    let mut declarations = Vec::new();

    // Globals: structs first, then constants, so functions can use both.
    for node in scopes.globals.iter().filter(|n| n.node_type == NodeType::StructDef) {
        declarations.push(generator.emit_global(node)?);
    }
    for node in scopes.globals.iter().filter(|n| n.node_type == NodeType::Constant) {
        declarations.push(generator.emit_global(node)?);
    }

    // Every package-level function name is claimed before any body, so a
    // local cannot shadow a function that another body calls.
    for flow in scopes.function_flows() {
        generator.declare_function(flow.entry, &flow.entry.label)?;
    }
    if let Some(flow) = scopes.main_flow() {
        generator.declare_function(flow.entry, &config.entry_function)?;
    }

    // Passes 3+4 for every function definition
    for flow in scopes.function_flows() {
        let order = pass3_schedule::schedule(flow, &index)?;
        declarations.push(generator.emit_func_def(flow, &order)?);
    }

    // Passes 3+4 for the main flow, when there is one
    let entry_point = match scopes.main_flow() {
        Some(flow) => {
            let order = pass3_schedule::schedule(flow, &index)?;
            Some(generator.emit_entry_function(flow, &order, &config.entry_function)?)
        }
        None => {
            info!(graph = %graph.id, "graph has no START node; emitting a library file");
            None
        }
    };

    // Imports are complete only once every body has been generated.
    let mut sections = vec![format!("package {}\n", config.package_name)];
    if !generator.imports().is_empty() {
        sections.push(generator.imports().render());
    }
    sections.extend(declarations);
    sections.extend(entry_point);
    Ok(sections.join("\n"))
}
