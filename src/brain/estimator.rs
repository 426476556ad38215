//! Best-yield estimation over the yield graph
//!
//! Two independent searches:
//!
//! - [`best_reachable_apy`]: the largest single-quote apy anywhere in the
//!   component reachable from a symbol. Not compounded across hops: a
//!   token that can go ETH -> stETH (3.5) -> wstETH (3.6) reports 3.6.
//! - [`BestPathSearch`]: FIFO relaxation from one source, keeping a
//!   predecessor per node, then rebuilding the paths to the best nodes.

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

use crate::cartographer::YieldGraph;
use crate::diagram::DiagramEdge;
use crate::rates::Symbol;

/// Default cap on relaxations for a single source-rooted search
pub const DEFAULT_MAX_RELAXATIONS: usize = 10_000;

/// Breadth-first walk from `start`, visiting each node once and keeping
/// the best apy of every pair seen on the way.
///
/// Returns `None` when the symbol is unknown or nothing downstream has a
/// usable apy.
pub fn best_reachable_apy(graph: &YieldGraph, start: &Symbol) -> Option<f64> {
    let start_node = graph.get_node(start)?;

    let mut best: Option<f64> = None;
    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut queue = VecDeque::new();

    visited.insert(start_node);
    queue.push_back(start_node);

    while let Some(node) = queue.pop_front() {
        for edge in graph.outgoing(node) {
            if let Some(apy) = edge.weight().best_apy() {
                if best.map_or(true, |b| apy > b) {
                    best = Some(apy);
                }
            }

            let target = edge.target();
            if visited.insert(target) {
                queue.push_back(target);
            }
        }
    }

    best
}

/// Source-rooted best paths, ready for the diagram renderer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BestPathSubgraph {
    pub source: Option<Symbol>,
    /// Highest best-apy among non-source nodes
    pub best_apy: Option<f64>,
    /// Every node sharing `best_apy`, in graph order
    pub targets: Vec<Symbol>,
    /// Nodes in the order they first appear along the rebuilt paths
    pub nodes: Vec<Symbol>,
    /// Rebuilt path edges, source side first, each pair at most once
    pub edges: Vec<DiagramEdge>,
    /// The relaxation cap was hit before the queue drained
    pub truncated: bool,
}

impl BestPathSubgraph {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// FIFO relaxation without a settled set.
///
/// An edge relaxes its target when its apy is strictly above the target's
/// recorded best; the target then goes back on the queue. The apy compared
/// is the edge's own, not an accumulated one, so each node's best can only
/// climb through the finite set of incoming apys. That bounds the total
/// number of relaxations by the pair count; `max_relaxations` is a hard
/// stop on top of it.
pub struct BestPathSearch<'a> {
    graph: &'a YieldGraph,
    max_relaxations: usize,
}

impl<'a> BestPathSearch<'a> {
    pub fn new(graph: &'a YieldGraph, max_relaxations: usize) -> Self {
        Self {
            graph,
            max_relaxations,
        }
    }

    pub fn subgraph_from(&self, source: &Symbol) -> BestPathSubgraph {
        let Some(source_node) = self.graph.get_node(source) else {
            debug!("{} is not in the yield graph", source);
            return BestPathSubgraph {
                source: Some(source.clone()),
                ..Default::default()
            };
        };

        let (best, pred, truncated) = self.relax(source_node);

        let best_apy = best
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != source_node.index())
            .filter_map(|(_, apy)| *apy)
            .fold(None, |acc: Option<f64>, apy| match acc {
                Some(a) if a >= apy => Some(a),
                _ => Some(apy),
            });

        let Some(best_apy) = best_apy else {
            return BestPathSubgraph {
                source: Some(source.clone()),
                truncated,
                ..Default::default()
            };
        };

        let target_nodes: Vec<NodeIndex> = self
            .graph
            .graph
            .node_indices()
            .filter(|&n| n != source_node && best[n.index()] == Some(best_apy))
            .collect();

        let mut edges = Vec::new();
        let mut seen_edges: HashSet<EdgeIndex> = HashSet::new();

        for &target in &target_nodes {
            for edge in self.path_to(source_node, target, &pred) {
                if seen_edges.insert(edge) {
                    edges.push(edge);
                }
            }
        }

        let mut nodes: Vec<Symbol> = Vec::new();
        let mut diagram_edges = Vec::with_capacity(edges.len());

        for edge in edges {
            let Some((from, to)) = self.graph.graph.edge_endpoints(edge) else {
                continue;
            };
            let from = self.graph.symbol(from);
            let to = self.graph.symbol(to);

            for symbol in [from, to] {
                if !nodes.contains(symbol) {
                    nodes.push(symbol.clone());
                }
            }

            diagram_edges.push(DiagramEdge {
                from: from.clone(),
                to: to.clone(),
                label: self.graph.graph[edge].label().to_string(),
            });
        }

        debug!(
            "Best paths from {}: {:.2}% at {} node(s), {} edges",
            source,
            best_apy,
            target_nodes.len(),
            diagram_edges.len()
        );

        BestPathSubgraph {
            source: Some(source.clone()),
            best_apy: Some(best_apy),
            targets: target_nodes
                .iter()
                .map(|&n| self.graph.symbol(n).clone())
                .collect(),
            nodes,
            edges: diagram_edges,
            truncated,
        }
    }

    /// Run the FIFO relaxation. Returns per-node best apy, per-node
    /// predecessor edge, and whether the cap cut the run short.
    fn relax(&self, source: NodeIndex) -> (Vec<Option<f64>>, Vec<Option<EdgeIndex>>, bool) {
        let node_count = self.graph.node_count();
        let mut best: Vec<Option<f64>> = vec![None; node_count];
        let mut pred: Vec<Option<EdgeIndex>> = vec![None; node_count];
        let mut queue = VecDeque::new();
        let mut relaxations = 0usize;

        best[source.index()] = Some(0.0);
        queue.push_back(source);

        while let Some(node) = queue.pop_front() {
            for edge in self.graph.outgoing(node) {
                let target = edge.target();
                // The root keeps its seed value and never gets a predecessor
                if target == source {
                    continue;
                }

                let Some(apy) = edge.weight().best_apy() else {
                    continue;
                };

                if best[target.index()].map_or(true, |b| apy > b) {
                    if relaxations >= self.max_relaxations {
                        warn!(
                            "Relaxation cap ({}) reached from {} - result may be partial",
                            self.max_relaxations,
                            self.graph.symbol(source)
                        );
                        return (best, pred, true);
                    }

                    best[target.index()] = Some(apy);
                    pred[target.index()] = Some(edge.id());
                    relaxations += 1;
                    queue.push_back(target);
                }
            }
        }

        (best, pred, false)
    }

    /// Follow predecessors from `target` back to `source`, returning the
    /// edges source side first. Stops early on a predecessor loop.
    fn path_to(
        &self,
        source: NodeIndex,
        target: NodeIndex,
        pred: &[Option<EdgeIndex>],
    ) -> Vec<EdgeIndex> {
        let mut path = Vec::new();
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut current = target;
        visited.insert(current);

        while current != source {
            let Some(edge) = pred[current.index()] else {
                break;
            };
            path.push(edge);

            let Some((prev, _)) = self.graph.graph.edge_endpoints(edge) else {
                break;
            };
            if !visited.insert(prev) {
                debug!("Predecessor loop at {}", self.graph.symbol(prev));
                break;
            }
            current = prev;
        }

        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateRecord;

    fn rate(from: &str, to: &str, kind: &str, apy: f64) -> RateRecord {
        RateRecord::new(from, to, kind, Some(apy))
    }

    fn sym(s: &str) -> Symbol {
        Symbol::parse(s).unwrap()
    }

    fn edge(from: &str, to: &str, label: &str) -> DiagramEdge {
        DiagramEdge {
            from: sym(from),
            to: sym(to),
            label: label.to_string(),
        }
    }

    #[test]
    fn test_best_reachable_is_not_compounded() {
        let graph = YieldGraph::from_rates(&[
            rate("ETH", "STETH", "stake", 3.5),
            rate("STETH", "WSTETH", "swap", 3.6),
        ]);

        assert_eq!(best_reachable_apy(&graph, &sym("ETH")), Some(3.6));
        assert_eq!(best_reachable_apy(&graph, &sym("STETH")), Some(3.6));
        assert_eq!(best_reachable_apy(&graph, &sym("WSTETH")), None);
        assert_eq!(best_reachable_apy(&graph, &sym("DAI")), None);
    }

    #[test]
    fn test_best_reachable_ignores_missing_apy() {
        let graph = YieldGraph::from_rates(&[
            RateRecord::new("ETH", "STETH", "stake", None),
            RateRecord::new("STETH", "WSTETH", "swap", Some(f64::NAN)),
            rate("WSTETH", "EZETH", "restake", 0.5),
        ]);

        assert_eq!(best_reachable_apy(&graph, &sym("ETH")), Some(0.5));
        assert_eq!(best_reachable_apy(&graph, &sym("EZETH")), None);
    }

    #[test]
    fn test_best_reachable_terminates_on_cycle() {
        let graph = YieldGraph::from_rates(&[rate("A", "B", "swap", 5.0), rate("B", "A", "swap", 6.0)]);
        assert_eq!(best_reachable_apy(&graph, &sym("A")), Some(6.0));
    }

    #[test]
    fn test_subgraph_on_cycle_terminates_without_duplicates() {
        let graph = YieldGraph::from_rates(&[rate("A", "B", "swap", 5.0), rate("B", "A", "swap", 6.0)]);
        let sub = BestPathSearch::new(&graph, DEFAULT_MAX_RELAXATIONS).subgraph_from(&sym("A"));

        assert!(!sub.truncated);
        assert_eq!(sub.best_apy, Some(5.0));
        assert_eq!(sub.targets, vec![sym("B")]);
        assert_eq!(sub.edges, vec![edge("A", "B", "swap")]);
        assert_eq!(sub.nodes, vec![sym("A"), sym("B")]);
    }

    #[test]
    fn test_subgraph_collects_all_ties() {
        let graph = YieldGraph::from_rates(&[
            rate("ETH", "STETH", "stake", 3.0),
            rate("STETH", "WSTETH", "swap", 4.0),
            rate("ETH", "EZETH", "restake", 4.0),
            rate("ETH", "WETH", "swap", 1.0),
        ]);
        let sub = BestPathSearch::new(&graph, DEFAULT_MAX_RELAXATIONS).subgraph_from(&sym("ETH"));

        assert_eq!(sub.best_apy, Some(4.0));
        assert_eq!(sub.targets, vec![sym("WSTETH"), sym("EZETH")]);
        assert_eq!(
            sub.edges,
            vec![
                edge("ETH", "STETH", "stake"),
                edge("STETH", "WSTETH", "swap"),
                edge("ETH", "EZETH", "restake"),
            ]
        );
        assert_eq!(sub.nodes, vec![sym("ETH"), sym("STETH"), sym("WSTETH"), sym("EZETH")]);
    }

    #[test]
    fn test_subgraph_shares_prefix_edges_once() {
        let graph = YieldGraph::from_rates(&[
            rate("ETH", "STETH", "stake", 3.0),
            rate("STETH", "A", "swap", 7.0),
            rate("STETH", "B", "swap", 7.0),
        ]);
        let sub = BestPathSearch::new(&graph, DEFAULT_MAX_RELAXATIONS).subgraph_from(&sym("ETH"));

        assert_eq!(sub.targets, vec![sym("A"), sym("B")]);
        assert_eq!(
            sub.edges,
            vec![
                edge("ETH", "STETH", "stake"),
                edge("STETH", "A", "swap"),
                edge("STETH", "B", "swap"),
            ]
        );
    }

    #[test]
    fn test_subgraph_later_improvement_replaces_predecessor() {
        // X is first reached at 1.0 from ETH, then at 2.0 through Y
        let graph = YieldGraph::from_rates(&[
            rate("ETH", "X", "swap", 1.0),
            rate("ETH", "Y", "stake", 0.5),
            rate("Y", "X", "restake", 2.0),
        ]);
        let sub = BestPathSearch::new(&graph, DEFAULT_MAX_RELAXATIONS).subgraph_from(&sym("ETH"));

        assert_eq!(sub.targets, vec![sym("X")]);
        assert_eq!(sub.edges, vec![edge("ETH", "Y", "stake"), edge("Y", "X", "restake")]);
    }

    #[test]
    fn test_subgraph_predecessor_loop_is_cut() {
        // X ends up with predecessor Y and Y with predecessor X
        let graph = YieldGraph::from_rates(&[
            rate("S", "X", "swap", 1.0),
            rate("X", "Y", "swap", 5.0),
            rate("Y", "X", "swap", 6.0),
        ]);
        let sub = BestPathSearch::new(&graph, DEFAULT_MAX_RELAXATIONS).subgraph_from(&sym("S"));

        assert_eq!(sub.best_apy, Some(6.0));
        assert_eq!(sub.targets, vec![sym("X")]);
        assert_eq!(sub.edges, vec![edge("X", "Y", "swap"), edge("Y", "X", "swap")]);
    }

    #[test]
    fn test_subgraph_unknown_or_dead_end_source() {
        let graph = YieldGraph::from_rates(&[rate("ETH", "STETH", "stake", 3.0)]);
        let search = BestPathSearch::new(&graph, DEFAULT_MAX_RELAXATIONS);

        assert!(search.subgraph_from(&sym("DAI")).is_empty());

        let dead_end = search.subgraph_from(&sym("STETH"));
        assert!(dead_end.is_empty());
        assert_eq!(dead_end.best_apy, None);
    }

    #[test]
    fn test_relaxation_cap_stops_search() {
        let graph = YieldGraph::from_rates(&[
            rate("S", "A", "swap", 1.0),
            rate("A", "B", "swap", 2.0),
            rate("B", "C", "swap", 3.0),
        ]);
        let sub = BestPathSearch::new(&graph, 2).subgraph_from(&sym("S"));

        assert!(sub.truncated);
        assert_eq!(sub.best_apy, Some(2.0));
        assert_eq!(sub.targets, vec![sym("B")]);
    }

    #[test]
    fn test_cap_equal_to_needed_relaxations_is_not_truncated() {
        let graph = YieldGraph::from_rates(&[rate("S", "A", "swap", 1.0), rate("A", "B", "swap", 2.0)]);
        let sub = BestPathSearch::new(&graph, 2).subgraph_from(&sym("S"));

        assert!(!sub.truncated, "search drained within the cap");
        assert_eq!(sub.best_apy, Some(2.0));
        assert_eq!(sub.edges, vec![edge("S", "A", "swap"), edge("A", "B", "swap")]);
    }
}
