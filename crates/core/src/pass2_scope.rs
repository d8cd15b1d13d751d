//! Pass 2: Scope resolution -- partition the graph into execution flows
//! (one main flow plus function-definition flows) and global definitions.

use crate::error::{NodeRef, TranspileError};
use crate::pass1_index::GraphIndex;
use axon_graph::{Node, NodeType};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// What an entry node opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    Main,
    Function,
}

impl EntryKind {
    /// The node type every leaf of a flow of this kind must have.
    pub fn terminator(self) -> NodeType {
        match self {
            EntryKind::Main => NodeType::End,
            EntryKind::Function => NodeType::Return,
        }
    }
}

/// An entry node plus everything reachable from it over execution edges.
#[derive(Debug, Clone)]
pub struct Flow<'g> {
    pub entry: &'g Node,
    /// Discovery order; the entry comes first.
    pub nodes: Vec<&'g Node>,
}

impl<'g> Flow<'g> {
    pub fn kind(&self) -> EntryKind {
        if self.entry.node_type == NodeType::Start {
            EntryKind::Main
        } else {
            EntryKind::Function
        }
    }
}

/// Result of scope resolution.
#[derive(Debug, Default)]
pub struct Scopes<'g> {
    pub flows: BTreeMap<EntryKind, Vec<Flow<'g>>>,
    /// CONSTANT and STRUCT_DEF nodes outside every flow, in declaration order.
    pub globals: Vec<&'g Node>,
    /// IGNORE nodes outside every flow. They are valid data sinks and emit
    /// nothing.
    pub sinks: Vec<&'g Node>,
}

impl<'g> Scopes<'g> {
    pub fn main_flow(&self) -> Option<&Flow<'g>> {
        self.flows.get(&EntryKind::Main).and_then(|flows| flows.first())
    }

    pub fn function_flows(&self) -> &[Flow<'g>] {
        self.flows
            .get(&EntryKind::Function)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

pub fn resolve_scopes<'g>(index: &GraphIndex<'g>) -> Result<Scopes<'g>, TranspileError> {
    let starts: Vec<String> = index
        .nodes()
        .filter(|n| n.node_type == NodeType::Start)
        .map(|n| n.id.clone())
        .collect();
    if starts.len() > 1 {
        return Err(TranspileError::MultipleEntryPoints { nodes: starts });
    }

    // node id -> entry node of the flow that claimed it
    let mut owner: HashMap<&'g str, &'g Node> = HashMap::new();
    let mut scopes = Scopes::default();

    for entry in index.nodes().filter(|n| n.node_type.is_entry()) {
        if let Some(claimer) = owner.get(entry.id.as_str()) {
            return Err(TranspileError::DefinitionInFlow {
                entry: NodeRef::of(claimer),
                node: NodeRef::of(entry),
                kind: entry.node_type,
            });
        }

        let flow = collect_flow(entry, index, &owner)?;
        check_termination(&flow, index)?;
        for node in &flow.nodes {
            owner.insert(node.id.as_str(), entry);
        }
        debug!(
            entry = %entry.id,
            kind = ?flow.kind(),
            nodes = flow.nodes.len(),
            "flow discovered"
        );
        scopes.flows.entry(flow.kind()).or_default().push(flow);
    }

    for node in index.nodes() {
        if owner.contains_key(node.id.as_str()) {
            continue;
        }
        match node.node_type {
            NodeType::Constant | NodeType::StructDef => scopes.globals.push(node),
            NodeType::Ignore => scopes.sinks.push(node),
            kind => {
                return Err(TranspileError::InvalidGlobal {
                    node: NodeRef::of(node),
                    kind,
                })
            }
        }
    }

    for edge in &index.graph.data_edges {
        let (Some(from_entry), Some(to_entry)) = (
            owner.get(edge.from_node_id.as_str()),
            owner.get(edge.to_node_id.as_str()),
        ) else {
            continue;
        };
        if from_entry.id != to_entry.id {
            let (Some(node), Some(source)) = (
                index.node(&edge.to_node_id),
                index.node(&edge.from_node_id),
            ) else {
                continue;
            };
            return Err(TranspileError::CrossFlowEdge {
                node: NodeRef::of(node),
                port: edge.to_port.clone(),
                source_node: NodeRef::of(source),
            });
        }
    }

    debug!(
        globals = scopes.globals.len(),
        sinks = scopes.sinks.len(),
        "scope resolution complete"
    );
    Ok(scopes)
}

/// Walk execution edges from `entry` with an explicit stack.
fn collect_flow<'g>(
    entry: &'g Node,
    index: &GraphIndex<'g>,
    owner: &HashMap<&'g str, &'g Node>,
) -> Result<Flow<'g>, TranspileError> {
    let mut seen: HashSet<&str> = HashSet::from([entry.id.as_str()]);
    let mut stack: Vec<&'g Node> = vec![entry];
    let mut nodes = Vec::new();

    while let Some(node) = stack.pop() {
        if node.id != entry.id {
            if matches!(
                node.node_type,
                NodeType::Start | NodeType::FuncDef | NodeType::StructDef
            ) {
                return Err(TranspileError::DefinitionInFlow {
                    entry: NodeRef::of(entry),
                    node: NodeRef::of(node),
                    kind: node.node_type,
                });
            }
            if let Some(first) = owner.get(node.id.as_str()) {
                return Err(TranspileError::SharedNode {
                    node: NodeRef::of(node),
                    first: NodeRef::of(first),
                    second: NodeRef::of(entry),
                });
            }
        }
        nodes.push(node);

        // Reverse so the first-declared successor is visited first.
        for succ in index.successors(&node.id).iter().rev() {
            if seen.insert(*succ) {
                if let Some(next) = index.node(succ) {
                    stack.push(next);
                }
            }
        }
    }

    Ok(Flow { entry, nodes })
}

fn check_termination(flow: &Flow<'_>, index: &GraphIndex<'_>) -> Result<(), TranspileError> {
    let terminator = flow.kind().terminator();
    let mut terminated = false;

    for node in &flow.nodes {
        let leaf = index.successors(&node.id).is_empty();
        if node.node_type == terminator {
            if !leaf {
                return Err(TranspileError::TerminatorHasSuccessor {
                    entry: NodeRef::of(flow.entry),
                    node: NodeRef::of(node),
                    terminator,
                });
            }
            terminated = true;
        } else if leaf {
            return Err(TranspileError::DanglingPath {
                entry: NodeRef::of(flow.entry),
                node: NodeRef::of(node),
                terminator,
            });
        }
    }

    if !terminated {
        return Err(TranspileError::MissingTerminator {
            entry: NodeRef::of(flow.entry),
            terminator,
        });
    }
    Ok(())
}
