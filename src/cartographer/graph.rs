//! Graph Construction
//!
//! Turns a rate list into a directed yield graph. One graph edge per
//! (from, to) pair; every quote for that pair is kept, in list order,
//! because the diagram label is chosen among them later.

use petgraph::graph::{DiGraph, EdgeIndex, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;
use tracing::info;

use crate::rates::{ingest, Quote, RateRecord, Symbol};

/// Output kinds preferred as diagram labels
const PREFERRED_KINDS: [&str; 2] = ["stake", "restake"];

/// A single quote on a pair
#[derive(Debug, Clone, PartialEq)]
pub struct PairQuote {
    pub kind: String,
    pub apy: Option<f64>,
}

/// All quotes between one (from, to) pair, in rate list order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairQuotes {
    pub quotes: Vec<PairQuote>,
}

impl PairQuotes {
    /// Highest usable apy among the quotes, if any.
    pub fn best_apy(&self) -> Option<f64> {
        self.quotes
            .iter()
            .filter_map(|q| q.apy)
            .fold(None, |best, apy| match best {
                Some(b) if b >= apy => Some(b),
                _ => Some(apy),
            })
    }

    /// Diagram label: the first stake/restake quote wins, otherwise the
    /// first quote's kind. Empty when the pair has no kind at all.
    pub fn label(&self) -> &str {
        self.quotes
            .iter()
            .find(|q| PREFERRED_KINDS.contains(&q.kind.as_str()))
            .or_else(|| self.quotes.first())
            .map(|q| q.kind.as_str())
            .unwrap_or("")
    }
}

/// The yield graph
pub struct YieldGraph {
    pub graph: DiGraph<Symbol, PairQuotes>,
    pub symbol_to_node: HashMap<Symbol, NodeIndex>,
    pair_to_edge: HashMap<(NodeIndex, NodeIndex), EdgeIndex>,
    /// Best apy of any quote landing on a symbol. Used for node labels only.
    pub target_apy: HashMap<Symbol, f64>,
    /// The ingested quotes the graph was built from, in rate list order
    quotes: Vec<Quote>,
}

impl YieldGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            symbol_to_node: HashMap::new(),
            pair_to_edge: HashMap::new(),
            target_apy: HashMap::new(),
            quotes: Vec::new(),
        }
    }

    pub fn from_rates(rates: &[RateRecord]) -> Self {
        Self::from_quotes(&ingest(rates))
    }

    pub fn from_quotes(quotes: &[Quote]) -> Self {
        let mut graph = Self::new();

        for quote in quotes {
            graph.add_quote(quote);
        }

        info!(
            "Graph built: {} Nodes, {} Pairs, {} Quotes",
            graph.node_count(),
            graph.edge_count(),
            quotes.len()
        );

        graph
    }

    /// Add one normalized quote to the graph.
    pub fn add_quote(&mut self, quote: &Quote) {
        let from = self.get_or_create_node(&quote.from);
        let to = self.get_or_create_node(&quote.to);

        let edge = match self.pair_to_edge.get(&(from, to)) {
            Some(&edge) => edge,
            None => {
                let edge = self.graph.add_edge(from, to, PairQuotes::default());
                self.pair_to_edge.insert((from, to), edge);
                edge
            }
        };

        self.graph[edge].quotes.push(PairQuote {
            kind: quote.kind.clone(),
            apy: quote.apy,
        });
        self.quotes.push(quote.clone());

        if let Some(apy) = quote.apy {
            let best = self.target_apy.entry(quote.to.clone()).or_insert(apy);
            if apy > *best {
                *best = apy;
            }
        }
    }

    fn get_or_create_node(&mut self, symbol: &Symbol) -> NodeIndex {
        if let Some(&node) = self.symbol_to_node.get(symbol) {
            return node;
        }

        let node = self.graph.add_node(symbol.clone());
        self.symbol_to_node.insert(symbol.clone(), node);
        node
    }

    pub fn get_node(&self, symbol: &Symbol) -> Option<NodeIndex> {
        self.symbol_to_node.get(symbol).copied()
    }

    pub fn symbol(&self, node: NodeIndex) -> &Symbol {
        &self.graph[node]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Forward adjacency of `node`, in the order pairs first appeared.
    ///
    /// petgraph hands back edges newest-first, so they are re-sorted by index.
    pub fn outgoing(&self, node: NodeIndex) -> Vec<EdgeReference<'_, PairQuotes>> {
        let mut edges: Vec<_> = self.graph.edges(node).collect();
        edges.sort_by_key(|e| e.id());
        edges
    }

    /// Reverse adjacency of `node`.
    pub fn incoming(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(node, Direction::Incoming)
    }

    /// Quotes whose input is `symbol`, in rate list order.
    pub fn quotes_from<'a>(&'a self, symbol: &'a Symbol) -> impl Iterator<Item = &'a Quote> + 'a {
        self.quotes.iter().filter(move |q| &q.from == symbol)
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Every pair in first-appearance order.
    pub fn pairs(&self) -> impl Iterator<Item = EdgeReference<'_, PairQuotes>> {
        self.graph.edge_references()
    }
}

impl Default for YieldGraph {
    fn default() -> Self {
        Self::new()
    }
}
