//! Top-level declarations: struct types, global constants, functions.

use super::{Generator, Scope};
use crate::error::{NodeRef, TranspileError};
use crate::pass2_scope::Flow;
use axon_graph::{Node, NodeType};

/// Short receiver identifier for a method on `type_name`:
/// `*models.User` becomes `u`.
pub(super) fn receiver_name(type_name: &str) -> String {
    let bare = type_name.trim().trim_start_matches('*');
    let bare = bare.rsplit('.').next().unwrap_or(bare);
    bare.chars()
        .next()
        .filter(|c| c.is_alphabetic())
        .map(|c| c.to_lowercase().collect())
        .unwrap_or_else(|| "r".to_string())
}

impl<'a> Generator<'a> {
    /// Emit a global CONSTANT or STRUCT_DEF, comments first.
    pub fn emit_global(&mut self, node: &Node) -> Result<String, TranspileError> {
        let mut out = self.comment_block(node, Scope::Global);
        match node.node_type {
            NodeType::StructDef => out.push_str(&self.emit_struct_def(node)?),
            NodeType::Constant => out.push_str(&self.emit_constant(node, Scope::Global)?),
            kind => {
                return Err(TranspileError::InvalidGlobal {
                    node: NodeRef::of(node),
                    kind,
                })
            }
        }
        Ok(out)
    }

    fn emit_struct_def(&mut self, node: &Node) -> Result<String, TranspileError> {
        self.bindings.declare_global(node, &node.label)?;
        let mut out = format!("type {} struct {{\n", node.label);
        for field in &node.inputs {
            let go_type = self.register_type(node, &field.type_name)?;
            out.push_str(&format!("\t{} {}\n", field.name, go_type));
        }
        out.push_str("}\n");
        Ok(out)
    }

    /// Claim the package-level name of a function before any body is
    /// generated, so no local can shadow a function another body calls.
    /// Methods live in their type's method set and claim nothing.
    pub fn declare_function(&mut self, entry: &Node, name: &str) -> Result<(), TranspileError> {
        if entry.input("receiver").is_some() {
            return Ok(());
        }
        self.bindings.declare_global(entry, name)
    }

    /// Emit a FUNC_DEF flow as a function or method declaration. `order` is
    /// the flow's schedule.
    pub fn emit_func_def(&mut self, flow: &Flow<'_>, order: &[&Node]) -> Result<String, TranspileError> {
        let entry = flow.entry;
        let mut out = self.comment_block(entry, Scope::Global);
        self.bindings.open_function_scope();

        let receiver = match entry.input("receiver") {
            Some(port) => {
                let go_type = self.register_type(entry, &port.type_name)?;
                let name = receiver_name(&go_type);
                self.bindings.declare_local(entry, &name)?;
                self.bindings.bind(&entry.id, &port.name, name.clone())?;
                format!("({} {}) ", name, go_type)
            }
            None => String::new(),
        };

        let mut params = Vec::with_capacity(entry.outputs.len());
        for port in &entry.outputs {
            let go_type = self.register_type(entry, &port.type_name)?;
            self.bindings.declare_local(entry, &port.name)?;
            self.bindings.bind(&entry.id, &port.name, port.name.clone())?;
            params.push(format!("{} {}", port.name, go_type));
        }

        let returns = self.return_types(flow)?;
        let results = match returns.len() {
            0 => String::new(),
            1 => format!(" {}", returns[0]),
            _ => format!(" ({})", returns.join(", ")),
        };

        out.push_str(&format!(
            "func {}{}({}){} {{\n",
            receiver,
            entry.label,
            params.join(", "),
            results
        ));
        out.push_str(&self.emit_body(order)?);
        out.push_str("}\n");
        Ok(out)
    }

    /// Emit the main flow as a parameterless function called `name`.
    pub fn emit_entry_function(
        &mut self,
        flow: &Flow<'_>,
        order: &[&Node],
        name: &str,
    ) -> Result<String, TranspileError> {
        let mut out = self.comment_block(flow.entry, Scope::Global);
        self.bindings.open_function_scope();
        out.push_str(&format!("func {}() {{\n", name));
        out.push_str(&self.emit_body(order)?);
        out.push_str("}\n");
        Ok(out)
    }

    /// Result types of a function, read from its RETURN nodes, which must
    /// all agree.
    fn return_types(&mut self, flow: &Flow<'_>) -> Result<Vec<String>, TranspileError> {
        let mut returns: Vec<&Node> = flow
            .nodes
            .iter()
            .copied()
            .filter(|n| n.node_type == NodeType::Return)
            .collect();
        returns.sort_by_key(|n| self.index.position(&n.id));

        let Some(first) = returns.first() else {
            return Ok(Vec::new());
        };
        let signature: Vec<&str> = first.inputs.iter().map(|p| p.type_name.trim()).collect();
        for other in &returns[1..] {
            let other_signature: Vec<&str> = other.inputs.iter().map(|p| p.type_name.trim()).collect();
            if other_signature != signature {
                return Err(TranspileError::ReturnMismatch {
                    function: NodeRef::of(flow.entry),
                    node: NodeRef::of(other),
                });
            }
        }

        let mut types = Vec::with_capacity(signature.len());
        for type_name in signature {
            types.push(self.register_type(first, type_name)?);
        }
        Ok(types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass1_index::build_index;
    use crate::pass2_scope::resolve_scopes;
    use crate::pass3_schedule::schedule;
    use axon_graph::{DataEdge, ExecEdge, Graph, Port};

    #[test]
    fn test_receiver_names() {
        assert_eq!(receiver_name("*models.User"), "u");
        assert_eq!(receiver_name("Account"), "a");
        assert_eq!(receiver_name("*_"), "r");
    }

    #[test]
    fn test_struct_def() {
        let mut g = Graph::new("g", "g");
        let mut user = Node::new("u", "User", NodeType::StructDef);
        user.inputs = vec![Port::new("Name", "string"), Port::new("Born", "time.Time")];
        g.nodes = vec![user];
        let index = build_index(&g).unwrap();
        let mut generator = Generator::new(&index);
        assert_eq!(
            generator.emit_global(&g.nodes[0]).unwrap(),
            "type User struct {\n\tName string\n\tBorn time.Time\n}\n"
        );
        assert!(generator.imports().contains("time"));
    }

    #[test]
    fn test_method_with_receiver() {
        let mut g = Graph::new("g", "g");
        let mut def = Node::new("d", "Greeting", NodeType::FuncDef);
        def.inputs.push(Port::new("receiver", "*User"));
        let mut ret = Node::new("r", "ret", NodeType::Return);
        ret.inputs.push(Port::new("self", "*User"));
        g.nodes = vec![def, ret];
        g.exec_edges = vec![ExecEdge::new("d", "r")];
        g.data_edges = vec![DataEdge::new("d", "receiver", "r", "self")];
        let index = build_index(&g).unwrap();
        let scopes = resolve_scopes(&index).unwrap();
        let flow = &scopes.function_flows()[0];
        let order = schedule(flow, &index).unwrap();
        let mut generator = Generator::new(&index);
        assert_eq!(
            generator.emit_func_def(flow, &order).unwrap(),
            "func (u *User) Greeting() *User {\n\treturn u\n}\n"
        );
    }

    #[test]
    fn test_parameter_named_like_receiver() {
        let mut g = Graph::new("g", "g");
        let mut def = Node::new("d", "Rename", NodeType::FuncDef);
        def.inputs.push(Port::new("receiver", "*User"));
        def.outputs.push(Port::new("u", "string"));
        let mut ret = Node::new("r", "ret", NodeType::Return);
        ret.inputs.push(Port::new("v", "string"));
        g.nodes = vec![def, ret];
        g.exec_edges = vec![ExecEdge::new("d", "r")];
        g.data_edges = vec![DataEdge::new("d", "u", "r", "v")];
        let index = build_index(&g).unwrap();
        let scopes = resolve_scopes(&index).unwrap();
        let flow = &scopes.function_flows()[0];
        let order = schedule(flow, &index).unwrap();
        let mut generator = Generator::new(&index);
        let err = generator.emit_func_def(flow, &order).unwrap_err();
        assert!(matches!(err, TranspileError::NameCollision { ref name, .. } if name == "u"));
    }

    #[test]
    fn test_methods_claim_no_package_name() {
        let mut g = Graph::new("g", "g");
        let mut method = Node::new("m", "Close", NodeType::FuncDef);
        method.inputs.push(Port::new("receiver", "*File"));
        let plain = Node::new("f", "Close", NodeType::FuncDef);
        g.nodes = vec![method, plain, Node::new("f2", "Close", NodeType::FuncDef)];
        let index = build_index(&g).unwrap();
        let mut generator = Generator::new(&index);
        generator.declare_function(&g.nodes[0], "Close").unwrap();
        generator.declare_function(&g.nodes[1], "Close").unwrap();
        let err = generator.declare_function(&g.nodes[2], "Close").unwrap_err();
        assert!(matches!(err, TranspileError::NameCollision { ref other, .. } if other.id == "f"));
    }

    #[test]
    fn test_return_mismatch() {
        let mut g = Graph::new("g", "g");
        let mut def = Node::new("d", "pick", NodeType::FuncDef);
        def.outputs.push(Port::new("n", "int"));
        let branch = Node::new("b", "branch", NodeType::Function);
        let mut r1 = Node::new("r1", "one", NodeType::Return);
        r1.inputs.push(Port::new("v", "int"));
        let mut r2 = Node::new("r2", "two", NodeType::Return);
        r2.inputs.push(Port::new("v", "string"));
        g.nodes = vec![def, branch, r1, r2];
        g.exec_edges = vec![
            ExecEdge::new("d", "b"),
            ExecEdge::new("b", "r1"),
            ExecEdge::new("b", "r2"),
        ];
        let index = build_index(&g).unwrap();
        let scopes = resolve_scopes(&index).unwrap();
        let flow = &scopes.function_flows()[0];
        let mut generator = Generator::new(&index);
        let err = generator.return_types(flow).unwrap_err();
        assert!(matches!(err, TranspileError::ReturnMismatch { ref node, .. } if node.id == "r2"));
    }
}
