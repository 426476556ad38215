//! Reachability pruning for the full diagram
//!
//! A node is reachable when it can get to a display token in zero or more
//! hops. An edge is only drawn when it lands directly on a display token:
//! an intermediate hop makes its source reachable, but that hop's own edge
//! stays hidden.

use petgraph::visit::EdgeRef;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

use super::YieldGraph;
use crate::diagram::DiagramEdge;
use crate::rates::Symbol;

/// Node and edge set of the full diagram
#[derive(Debug, Clone, Default)]
pub struct PrunedGraph {
    /// Everything that reaches a display token, display tokens included
    pub reachable: HashSet<Symbol>,
    /// Endpoints of the surviving edges, sorted
    pub nodes: BTreeSet<Symbol>,
    /// Surviving edges in first-appearance order
    pub edges: Vec<DiagramEdge>,
}

/// Walk reverse edges out of the display set.
pub fn reverse_reachable(graph: &YieldGraph, display: &HashSet<Symbol>) -> HashSet<Symbol> {
    let mut reachable: HashSet<Symbol> = display.clone();
    let mut stack: Vec<_> = display
        .iter()
        .filter_map(|symbol| graph.get_node(symbol))
        .collect();

    while let Some(node) = stack.pop() {
        for prev in graph.incoming(node) {
            if reachable.insert(graph.symbol(prev).clone()) {
                stack.push(prev);
            }
        }
    }

    reachable
}

pub fn prune(graph: &YieldGraph, display: &HashSet<Symbol>) -> PrunedGraph {
    let reachable = reverse_reachable(graph, display);
    let mut nodes = BTreeSet::new();
    let mut edges = Vec::new();

    for edge in graph.pairs() {
        let to = graph.symbol(edge.target());
        if !reachable.contains(to) || !display.contains(to) {
            continue;
        }

        let from = graph.symbol(edge.source());
        nodes.insert(from.clone());
        nodes.insert(to.clone());
        edges.push(DiagramEdge {
            from: from.clone(),
            to: to.clone(),
            label: edge.weight().label().to_string(),
        });
    }

    debug!(
        "Pruned graph: {} reachable, {} nodes, {} edges kept of {}",
        reachable.len(),
        nodes.len(),
        edges.len(),
        graph.edge_count()
    );

    PrunedGraph { reachable, nodes, edges }
}
