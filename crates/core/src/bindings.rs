//! Variable binding tracker: which Go identifier carries the value of each
//! `(producer node, output port)` pair, and which identifiers are already
//! taken in the scope being generated.

use crate::error::{NodeRef, TranspileError};
use crate::pass1_index::GraphIndex;
use axon_graph::{Node, NodeType};
use std::collections::HashMap;

/// The Go blank identifier, bound to outputs that are explicitly ignored.
pub const DISCARD: &str = "_";

/// Per-call binding table. Owned by one generator; never shared.
pub struct VariableBindings<'a> {
    index: &'a GraphIndex<'a>,
    bound: HashMap<String, HashMap<String, String>>,
    /// Package-level identifiers and the node that declared each.
    package_names: HashMap<String, NodeRef>,
    /// Identifiers of the function body being generated.
    local_names: HashMap<String, NodeRef>,
}

impl<'a> VariableBindings<'a> {
    pub fn new(index: &'a GraphIndex<'a>) -> Self {
        VariableBindings {
            index,
            bound: HashMap::new(),
            package_names: HashMap::new(),
            local_names: HashMap::new(),
        }
    }

    /// Claim a package-level identifier for `node`.
    pub fn declare_global(&mut self, node: &Node, name: &str) -> Result<(), TranspileError> {
        if name == DISCARD {
            return Ok(());
        }
        if let Some(other) = self.package_names.get(name) {
            return Err(collision(name, node, other));
        }
        self.package_names.insert(name.to_string(), NodeRef::of(node));
        Ok(())
    }

    /// Claim an identifier in the current function body. A local may not
    /// shadow a package-level name either: later reads of the global would
    /// silently see the local.
    pub fn declare_local(&mut self, node: &Node, name: &str) -> Result<(), TranspileError> {
        if name == DISCARD {
            return Ok(());
        }
        if let Some(other) = self
            .local_names
            .get(name)
            .or_else(|| self.package_names.get(name))
        {
            return Err(collision(name, node, other));
        }
        self.local_names.insert(name.to_string(), NodeRef::of(node));
        Ok(())
    }

    /// Start a new function body; its locals are independent of the last.
    pub fn open_function_scope(&mut self) {
        self.local_names.clear();
    }

    /// Record the name carrying `node.port`. Binding a key twice means the
    /// generator visited a node twice, which is a bug, not bad input.
    pub fn bind(&mut self, node_id: &str, port: &str, name: impl Into<String>) -> Result<(), TranspileError> {
        let ports = self.bound.entry(node_id.to_string()).or_default();
        if ports.contains_key(port) {
            return Err(TranspileError::Internal(format!(
                "output '{}' of node '{}' was bound twice",
                port, node_id
            )));
        }
        ports.insert(port.to_string(), name.into());
        Ok(())
    }

    /// The name bound to `node.port`, if it has been generated.
    pub fn name_of(&self, node_id: &str, port: &str) -> Option<&str> {
        self.bound
            .get(node_id)
            .and_then(|ports| ports.get(port))
            .map(String::as_str)
    }

    /// Resolve the variable flowing into `consumer.port`.
    pub fn lookup(&self, consumer: &Node, port: &str) -> Result<&str, TranspileError> {
        let edge = self
            .index
            .incoming(&consumer.id, port)
            .ok_or_else(|| TranspileError::MissingInput {
                node: NodeRef::of(consumer),
                port: port.to_string(),
            })?;
        self.name_of(&edge.from_node_id, &edge.from_port).ok_or_else(|| {
            let source = self
                .index
                .node(&edge.from_node_id)
                .map(|n| NodeRef::of(n).to_string())
                .unwrap_or_else(|| edge.from_node_id.clone());
            TranspileError::Internal(format!(
                "input '{}' of node {} reads output '{}' of {}, which has no generated value",
                port,
                NodeRef::of(consumer),
                edge.from_port,
                source
            ))
        })
    }

    /// True if any data edge leaves `node.port`.
    pub fn is_connected(&self, node_id: &str, port: &str) -> bool {
        !self.index.consumers(node_id, port).is_empty()
    }

    /// True if `node.port` is consumed, and only by IGNORE nodes.
    pub fn is_connected_to_ignore(&self, node_id: &str, port: &str) -> bool {
        let consumers = self.index.consumers(node_id, port);
        !consumers.is_empty()
            && consumers.iter().all(|edge| {
                self.index
                    .node(&edge.to_node_id)
                    .is_some_and(|n| n.node_type == NodeType::Ignore)
            })
    }
}

fn collision(name: &str, node: &Node, other: &NodeRef) -> TranspileError {
    TranspileError::NameCollision {
        name: name.to_string(),
        node: NodeRef::of(node),
        other: other.clone(),
    }
}
