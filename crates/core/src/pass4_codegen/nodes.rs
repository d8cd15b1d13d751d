//! Statement templates for the node types that produce code in a body.

use super::{Generator, Scope};
use crate::bindings::DISCARD;
use crate::error::{NodeRef, TranspileError};
use axon_graph::{Node, Port};

const BASIC_TYPES: &[&str] = &[
    "bool", "string", "byte", "rune", "int", "int8", "int16", "int32", "int64", "uint", "uint8",
    "uint16", "uint32", "uint64", "uintptr", "float32", "float64", "complex64", "complex128",
];

/// Types a Go `const` declaration may carry.
pub(super) fn is_basic_type(type_name: &str) -> bool {
    BASIC_TYPES.contains(&type_name)
}

/// `&Point`, `Point` and `&geo.Point` build a composite literal rather than
/// applying a binary operator. `&`, `&&` and `&^` stay binary operators: after
/// the address-of sigil an identifier must follow.
pub(super) fn is_struct_construction(op: &str) -> bool {
    match op.strip_prefix('&') {
        Some(rest) => rest.starts_with(|c: char| c.is_alphabetic() || c == '_'),
        None => op.starts_with(|c: char| c.is_ascii_uppercase()),
    }
}

fn first_output<'n>(node: &'n Node) -> Result<&'n Port, TranspileError> {
    node.outputs
        .first()
        .ok_or_else(|| TranspileError::MissingOutputPort {
            node: NodeRef::of(node),
            kind: node.node_type,
        })
}

fn required_config<'n>(node: &'n Node, key: &str) -> Result<&'n str, TranspileError> {
    node.config_value(key)
        .ok_or_else(|| TranspileError::MissingConfig {
            node: NodeRef::of(node),
            kind: node.node_type,
            key: key.to_string(),
        })
}

impl<'a> Generator<'a> {
    /// Name for a value produced inside a function body. Go rejects unused
    /// locals, so the output must be read by some node; when only IGNORE
    /// nodes read it, the value goes to `_`.
    fn local_output_name(&mut self, node: &Node, port: &Port, name: String) -> Result<String, TranspileError> {
        if !self.bindings.is_connected(&node.id, &port.name) {
            return Err(TranspileError::UnusedOutput {
                node: NodeRef::of(node),
                port: port.name.clone(),
            });
        }
        if self.bindings.is_connected_to_ignore(&node.id, &port.name) {
            return Ok(DISCARD.to_string());
        }
        self.bindings.declare_local(node, &name)?;
        Ok(name)
    }

    pub(super) fn emit_constant(&mut self, node: &Node, scope: Scope) -> Result<String, TranspileError> {
        let value = required_config(node, "value")?;
        let port = first_output(node)?;
        let type_name = port.type_name.trim();
        let go_type = if type_name.is_empty() {
            None
        } else {
            Some(self.register_type(node, type_name)?)
        };

        let name = match scope {
            Scope::Global => {
                self.bindings.declare_global(node, &node.label)?;
                node.label.clone()
            }
            Scope::Local => self.local_output_name(node, port, node.label.clone())?,
        };
        self.bindings.bind(&node.id, &port.name, name.clone())?;

        Ok(match (scope, go_type) {
            (Scope::Global, None) => format!("const {} = {}\n", name, value),
            (Scope::Global, Some(ty)) => {
                let keyword = if is_basic_type(&ty) { "const" } else { "var" };
                format!("{} {} {} = {}\n", keyword, name, ty, value)
            }
            (Scope::Local, None) if name == DISCARD => format!("\t_ = {}\n", value),
            (Scope::Local, None) => format!("\t{} := {}\n", name, value),
            (Scope::Local, Some(ty)) => format!("\tvar {} {} = {}\n", name, ty, value),
        })
    }

    pub(super) fn emit_operator(&mut self, node: &Node) -> Result<String, TranspileError> {
        let op = required_config(node, "op")?.trim();
        let port = first_output(node)?;

        let expr = if is_struct_construction(op) {
            let (sigil, type_name) = match op.strip_prefix('&') {
                Some(rest) => ("&", rest),
                None => ("", op),
            };
            let go_type = self.register_type(node, type_name)?;
            let mut args = Vec::with_capacity(node.inputs.len());
            for input in &node.inputs {
                args.push(self.bindings.lookup(node, &input.name)?.to_string());
            }
            format!("{}{}{{{}}}", sigil, go_type, args.join(", "))
        } else {
            let a = self.bindings.lookup(node, "a")?.to_string();
            let b = self.bindings.lookup(node, "b")?.to_string();
            format!("{} {} {}", a, op, b)
        };

        let name = self.local_output_name(node, port, node.label.clone())?;
        self.bindings.bind(&node.id, &port.name, name.clone())?;
        if name == DISCARD {
            return Ok(format!("\t_ = {}\n", expr));
        }
        Ok(format!("\t{} := {}\n", name, expr))
    }

    pub(super) fn emit_function_call(&mut self, node: &Node) -> Result<String, TranspileError> {
        if node.impl_reference.trim().is_empty() {
            return Err(TranspileError::MissingReference {
                node: NodeRef::of(node),
            });
        }
        let target = self.call_target(node)?;

        let mut args = Vec::with_capacity(node.inputs.len());
        for input in &node.inputs {
            args.push(self.bindings.lookup(node, &input.name)?.to_string());
        }
        let call = format!("{}({})", target, args.join(", "));

        if node.outputs.is_empty() {
            return Ok(format!("\t{}\n", call));
        }

        let mut names = Vec::with_capacity(node.outputs.len());
        for (i, port) in node.outputs.iter().enumerate() {
            let default_name = if node.outputs.len() == 1 {
                node.label.clone()
            } else {
                format!("{}{}", node.label, i)
            };
            let name = self.local_output_name(node, port, default_name)?;
            self.bindings.bind(&node.id, &port.name, name.clone())?;
            names.push(name);
        }

        // `:=` needs at least one new name on the left.
        let assign = if names.iter().all(|n| n == DISCARD) { "=" } else { ":=" };
        Ok(format!("\t{} {} {}\n", names.join(", "), assign, call))
    }

    pub(super) fn emit_return(&mut self, node: &Node) -> Result<String, TranspileError> {
        if node.inputs.is_empty() {
            return Ok("\treturn\n".to_string());
        }
        let mut values = Vec::with_capacity(node.inputs.len());
        for input in &node.inputs {
            values.push(self.bindings.lookup(node, &input.name)?.to_string());
        }
        Ok(format!("\treturn {}\n", values.join(", ")))
    }
}
