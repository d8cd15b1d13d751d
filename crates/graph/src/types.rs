//! Typed structs representing an Axon node graph.
//!
//! A graph is a flat list of nodes plus two edge lists: data edges carry
//! values between ports, execution edges fix the order in which
//! side-effecting nodes run. The transpiler only ever reads these types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ── Node kinds ──────────────────────────────────────────────────────

/// The closed set of node kinds a graph may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Start,
    End,
    Return,
    Constant,
    Function,
    Operator,
    Ignore,
    StructDef,
    FuncDef,
}

impl NodeType {
    /// The spelling used in graph files and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Start => "START",
            NodeType::End => "END",
            NodeType::Return => "RETURN",
            NodeType::Constant => "CONSTANT",
            NodeType::Function => "FUNCTION",
            NodeType::Operator => "OPERATOR",
            NodeType::Ignore => "IGNORE",
            NodeType::StructDef => "STRUCT_DEF",
            NodeType::FuncDef => "FUNC_DEF",
        }
    }

    /// START and FUNC_DEF nodes open an execution flow.
    pub fn is_entry(&self) -> bool {
        matches!(self, NodeType::Start | NodeType::FuncDef)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse value category attached to a port.
///
/// Unknown categories deserialize to `Unspecified` so graphs written by
/// newer editors still load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Bool,
    Int,
    Float,
    String,
    ByteArray,
    Error,
    Struct,
    Any,
    #[default]
    #[serde(other)]
    Unspecified,
}

impl DataType {
    pub fn is_unspecified(&self) -> bool {
        matches!(self, DataType::Unspecified)
    }
}

// ── Ports and nodes ─────────────────────────────────────────────────

/// A typed input or output slot on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    /// Semantic type in the output language, e.g. `string` or `*pkg.Type`.
    #[serde(default, alias = "typeName")]
    pub type_name: String,
    #[serde(default, alias = "dataType", skip_serializing_if = "DataType::is_unspecified")]
    pub data_type: DataType,
}

impl Port {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Port {
            name: name.into(),
            type_name: type_name.into(),
            data_type: DataType::Unspecified,
        }
    }
}

/// A single node of the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub inputs: Vec<Port>,
    #[serde(default)]
    pub outputs: Vec<Port>,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
    #[serde(default, alias = "implReference", skip_serializing_if = "String::is_empty")]
    pub impl_reference: String,
    #[serde(default, alias = "commentIds", skip_serializing_if = "Vec::is_empty")]
    pub comment_ids: Vec<String>,
    /// Editor layout data. Carried through load/save untouched.
    #[serde(default, alias = "visualInfo", skip_serializing_if = "Option::is_none")]
    pub visual_info: Option<serde_json::Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, node_type: NodeType) -> Self {
        Node {
            id: id.into(),
            label: label.into(),
            node_type,
            inputs: Vec::new(),
            outputs: Vec::new(),
            config: BTreeMap::new(),
            impl_reference: String::new(),
            comment_ids: Vec::new(),
            visual_info: None,
        }
    }

    pub fn input(&self, name: &str) -> Option<&Port> {
        self.inputs.iter().find(|p| p.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&Port> {
        self.outputs.iter().find(|p| p.name == name)
    }

    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }
}

// ── Edges ───────────────────────────────────────────────────────────

/// A value flowing from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEdge {
    #[serde(alias = "fromNodeId")]
    pub from_node_id: String,
    #[serde(alias = "fromPort")]
    pub from_port: String,
    #[serde(alias = "toNodeId")]
    pub to_node_id: String,
    #[serde(alias = "toPort")]
    pub to_port: String,
}

impl DataEdge {
    pub fn new(
        from_node_id: impl Into<String>,
        from_port: impl Into<String>,
        to_node_id: impl Into<String>,
        to_port: impl Into<String>,
    ) -> Self {
        DataEdge {
            from_node_id: from_node_id.into(),
            from_port: from_port.into(),
            to_node_id: to_node_id.into(),
            to_port: to_port.into(),
        }
    }
}

/// A control-flow edge: `to_node_id` runs after `from_node_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecEdge {
    #[serde(alias = "fromNodeId")]
    pub from_node_id: String,
    #[serde(alias = "toNodeId")]
    pub to_node_id: String,
}

impl ExecEdge {
    pub fn new(from_node_id: impl Into<String>, to_node_id: impl Into<String>) -> Self {
        ExecEdge {
            from_node_id: from_node_id.into(),
            to_node_id: to_node_id.into(),
        }
    }
}

/// Free-form note attached to nodes through `Node::comment_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub content: String,
}

// ── Graph ───────────────────────────────────────────────────────────

/// A complete Axon program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default, alias = "dataEdges")]
    pub data_edges: Vec<DataEdge>,
    #[serde(default, alias = "execEdges")]
    pub exec_edges: Vec<ExecEdge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
    /// Package paths the generated file must import regardless of usage.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
}

impl Graph {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Graph {
            id: id.into(),
            name: name.into(),
            ..Graph::default()
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn comment(&self, id: &str) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == id)
    }
}
