//! The router as a pure function
//!
//! Callers hand in a rate list and holdings and get back enriched holdings
//! plus diagram text. Nothing here touches the network or the filesystem,
//! and the graph is rebuilt on every call.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::brain::{reconcile, BestPathSearch, DEFAULT_MAX_RELAXATIONS};
use crate::cartographer::{prune, YieldGraph};
use crate::diagram::{DiagramRenderer, DEFAULT_HEADER};
use crate::rates::{RateRecord, Symbol};
use crate::tokens::{default_display_set, TokenRecord};

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Tokens allowed to terminate an edge of the full diagram
    pub display_tokens: HashSet<Symbol>,
    pub max_relaxations: usize,
    pub diagram_header: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            display_tokens: default_display_set(),
            max_relaxations: DEFAULT_MAX_RELAXATIONS,
            diagram_header: DEFAULT_HEADER.to_string(),
        }
    }
}

/// Which diagram the caller wants shown.
///
/// This is the whole contract between whoever triggers a diagram and the
/// renderer: send a request, get text back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "source", rename_all = "snake_case")]
pub enum DiagramRequest {
    /// Every edge that lands on a display token
    Full,
    /// Best-yield paths out of one symbol
    BestPathsFrom(String),
}

/// Everything one pass of the router produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub tokens: Vec<TokenRecord>,
    pub highlighted: BTreeSet<Symbol>,
    pub diagram: String,
}

/// Enrich the holdings and answer `request`, over one graph build.
pub fn analyze(
    rates: &[RateRecord],
    tokens: &[TokenRecord],
    request: &DiagramRequest,
    options: &EngineOptions,
) -> Analysis {
    let graph = YieldGraph::from_rates(rates);
    let reconciliation = reconcile(tokens, rates, &graph);

    Analysis {
        tokens: reconciliation.tokens,
        highlighted: reconciliation.highlighted,
        diagram: diagram_for(&graph, request, options),
    }
}

/// Answer a diagram request from scratch.
pub fn render_diagram(rates: &[RateRecord], request: &DiagramRequest, options: &EngineOptions) -> String {
    diagram_for(&YieldGraph::from_rates(rates), request, options)
}

fn diagram_for(graph: &YieldGraph, request: &DiagramRequest, options: &EngineOptions) -> String {
    match request {
        DiagramRequest::Full => full_diagram(graph, options),
        DiagramRequest::BestPathsFrom(source) => best_path_diagram(graph, source, options),
    }
}

/// Pruned diagram, nodes sorted.
pub fn full_diagram(graph: &YieldGraph, options: &EngineOptions) -> String {
    let pruned = prune(graph, &options.display_tokens);
    DiagramRenderer::new(&options.diagram_header, &graph.target_apy).render(&pruned.nodes, &pruned.edges)
}

/// Best-path subgraph from `source`, nodes in path order.
pub fn best_path_diagram(graph: &YieldGraph, source: &str, options: &EngineOptions) -> String {
    let renderer = DiagramRenderer::new(&options.diagram_header, &graph.target_apy);

    let Some(source) = Symbol::parse(source) else {
        return renderer.render(&Vec::<Symbol>::new(), &[]);
    };

    let subgraph = BestPathSearch::new(graph, options.max_relaxations).subgraph_from(&source);
    renderer.render(&subgraph.nodes, &subgraph.edges)
}
