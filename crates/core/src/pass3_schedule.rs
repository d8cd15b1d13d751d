//! Pass 3: Scheduling -- order the nodes of one flow for emission.
//!
//! Kahn's algorithm over the flow's execution edges. Ties between ready
//! nodes break on declaration order, so identical graphs always schedule
//! identically. A second run adds the flow's data edges as ordering
//! constraints; execution order stays the primary key, and a data edge that
//! contradicts it is reported rather than silently reordered.

use crate::error::{NodeRef, TranspileError};
use crate::pass1_index::GraphIndex;
use crate::pass2_scope::Flow;
use axon_graph::Node;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Return the emission order of `flow`, entry node first.
pub fn schedule<'g>(flow: &Flow<'g>, index: &GraphIndex<'g>) -> Result<Vec<&'g Node>, TranspileError> {
    // Local numbering in declaration order; the ready set is a BTreeSet of
    // these, so its minimum is always the earliest-declared ready node.
    let mut nodes: Vec<&'g Node> = flow.nodes.clone();
    nodes.sort_by_key(|n| index.position(&n.id));
    let local: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let mut exec_edges: Vec<(usize, usize)> = Vec::new();
    for (from, node) in nodes.iter().enumerate() {
        for succ in index.successors(&node.id) {
            if let Some(&to) = local.get(succ) {
                exec_edges.push((from, to));
            }
        }
    }

    let (_, leftover) = kahn(nodes.len(), &exec_edges);
    if !leftover.is_empty() {
        return Err(TranspileError::Cycle {
            entry: NodeRef::of(flow.entry),
            nodes: on_cycle(&leftover, &exec_edges)
                .into_iter()
                .map(|i| nodes[i].id.clone())
                .collect(),
        });
    }

    let mut all_edges = exec_edges;
    for edge in &index.graph.data_edges {
        if let (Some(&from), Some(&to)) = (
            local.get(edge.from_node_id.as_str()),
            local.get(edge.to_node_id.as_str()),
        ) {
            all_edges.push((from, to));
        }
    }

    let (order, leftover) = kahn(nodes.len(), &all_edges);
    if !leftover.is_empty() {
        return Err(TranspileError::DataOrderConflict {
            entry: NodeRef::of(flow.entry),
            nodes: on_cycle(&leftover, &all_edges)
                .into_iter()
                .map(|i| nodes[i].id.clone())
                .collect(),
        });
    }

    let ordered: Vec<&'g Node> = order.into_iter().map(|i| nodes[i]).collect();
    debug!(
        entry = %flow.entry.id,
        order = ?ordered.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(),
        "flow scheduled"
    );
    Ok(ordered)
}

/// Kahn's algorithm over `n` vertices. Returns the emitted order and the
/// vertices that never became ready (those on or behind a cycle), both
/// ascending where there is a choice.
fn kahn(n: usize, edges: &[(usize, usize)]) -> (Vec<usize>, Vec<usize>) {
    let mut in_degree = vec![0usize; n];
    let mut out: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(from, to) in edges {
        in_degree[to] += 1;
        out[from].push(to);
    }

    let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while let Some(next) = ready.pop_first() {
        order.push(next);
        for &to in &out[next] {
            in_degree[to] -= 1;
            if in_degree[to] == 0 {
                ready.insert(to);
            }
        }
    }

    let leftover = (0..n).filter(|&i| in_degree[i] > 0).collect();
    (order, leftover)
}

/// The Kahn leftovers that can reach themselves. Leftovers merely
/// downstream of a cycle are dropped. Keeps ascending order.
fn on_cycle(leftover: &[usize], edges: &[(usize, usize)]) -> Vec<usize> {
    let rest: HashSet<usize> = leftover.iter().copied().collect();
    let mut out: HashMap<usize, Vec<usize>> = HashMap::new();
    for &(from, to) in edges {
        if rest.contains(&from) && rest.contains(&to) {
            out.entry(from).or_default().push(to);
        }
    }

    leftover
        .iter()
        .copied()
        .filter(|&start| {
            let mut seen = HashSet::new();
            let mut stack: Vec<usize> = out.get(&start).cloned().unwrap_or_default();
            while let Some(v) = stack.pop() {
                if v == start {
                    return true;
                }
                if seen.insert(v) {
                    if let Some(next) = out.get(&v) {
                        stack.extend(next.iter().copied());
                    }
                }
            }
            false
        })
        .collect()
}
