//! Pass 4: Code generation -- Go text for scheduled flows and globals.
//!
//! One [`Generator`] lives for one transpile call. It owns the binding
//! table and the import tracker, so every statement it emits sees the
//! names and packages registered by the statements before it.

mod globals;
mod nodes;

use crate::bindings::VariableBindings;
use crate::error::{NodeRef, TranspileError};
use crate::imports::{ImportTracker, TypeRef};
use crate::pass1_index::GraphIndex;
use axon_graph::{Node, NodeType};
use std::collections::HashSet;
use tracing::warn;

/// Where a declaration lands in the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Top level of the file.
    Global,
    /// Inside a function body.
    Local,
}

impl Scope {
    pub fn indent(self) -> &'static str {
        match self {
            Scope::Global => "",
            Scope::Local => "\t",
        }
    }
}

pub struct Generator<'a> {
    index: &'a GraphIndex<'a>,
    bindings: VariableBindings<'a>,
    imports: ImportTracker,
    /// Labels of plain FUNC_DEF nodes; callable without a package qualifier.
    local_functions: HashSet<&'a str>,
}

impl<'a> Generator<'a> {
    pub fn new(index: &'a GraphIndex<'a>) -> Self {
        let mut imports = ImportTracker::new();
        for path in &index.graph.imports {
            imports.add_path(path);
        }
        let local_functions = index
            .nodes()
            .filter(|n| n.node_type == NodeType::FuncDef && n.input("receiver").is_none())
            .map(|n| n.label.as_str())
            .collect();
        Generator {
            index,
            bindings: VariableBindings::new(index),
            imports,
            local_functions,
        }
    }

    pub fn imports(&self) -> &ImportTracker {
        &self.imports
    }

    pub fn bindings(&self) -> &VariableBindings<'a> {
        &self.bindings
    }

    /// Emit the statement for one node inside a function body. Entry,
    /// terminator, sink and definition nodes emit nothing here.
    pub fn emit_node(&mut self, node: &Node) -> Result<String, TranspileError> {
        match node.node_type {
            NodeType::Start
            | NodeType::End
            | NodeType::Ignore
            | NodeType::StructDef
            | NodeType::FuncDef => Ok(String::new()),
            NodeType::Constant => self.emit_constant(node, Scope::Local),
            NodeType::Operator => self.emit_operator(node),
            NodeType::Function => self.emit_function_call(node),
            NodeType::Return => self.emit_return(node),
        }
    }

    /// Emit a scheduled flow body. The entry node's comments belong to the
    /// enclosing declaration, so they are skipped here.
    pub fn emit_body(&mut self, order: &[&Node]) -> Result<String, TranspileError> {
        let mut out = String::new();
        for node in order {
            if !node.node_type.is_entry() {
                out.push_str(&self.comment_block(node, Scope::Local));
            }
            out.push_str(&self.emit_node(node)?);
        }
        Ok(out)
    }

    /// `// line` for every line of every comment attached to `node`.
    pub fn comment_block(&self, node: &Node, scope: Scope) -> String {
        let mut out = String::new();
        for id in &node.comment_ids {
            let Some(comment) = self.index.comment(id) else {
                warn!(node = %node.id, comment = %id, "node references unknown comment");
                continue;
            };
            for line in comment.content.trim().lines() {
                let line = line.trim_end();
                if line.is_empty() {
                    out.push_str(&format!("{}//\n", scope.indent()));
                } else {
                    out.push_str(&format!("{}// {}\n", scope.indent(), line));
                }
            }
        }
        out
    }

    /// Parse and register a type string, returning its Go spelling.
    fn register_type(&mut self, node: &Node, type_name: &str) -> Result<String, TranspileError> {
        self.imports
            .register(type_name)
            .map(|t| t.render())
            .map_err(|reason| TranspileError::Dependency {
                node: NodeRef::of(node),
                reference: type_name.to_string(),
                reason,
            })
    }

    /// Resolve a FUNCTION node's reference to the callee spelling.
    fn call_target(&mut self, node: &Node) -> Result<String, TranspileError> {
        let reference = node.impl_reference.trim();
        let dependency = |reason: String| TranspileError::Dependency {
            node: NodeRef::of(node),
            reference: reference.to_string(),
            reason,
        };
        let target: TypeRef = self.imports.register(reference).map_err(dependency)?;
        if !target.is_qualified()
            && !crate::imports::is_builtin(&target.bare_type)
            && !self.local_functions.contains(target.bare_type.as_str())
        {
            return Err(dependency(
                "expected format 'package.Function', a Go builtin, or a function defined in this graph"
                    .to_string(),
            ));
        }
        Ok(target.render())
    }
}
