//! Token reconciliation
//!
//! Folds the rate list into the holdings: best direct yield (`apr`), best
//! yield anywhere downstream (`maxApr`) and the direct quotes themselves.

use std::collections::BTreeSet;
use tracing::{debug, info};

use super::estimator::best_reachable_apy;
use crate::cartographer::YieldGraph;
use crate::rates::{format_apy, Quote, RateRecord, Symbol};
use crate::tokens::TokenRecord;

/// Shown when a token has no usable direct quote
pub const NOT_AVAILABLE: &str = "N/A";

/// Holdings after reconciliation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub tokens: Vec<TokenRecord>,
    /// Every symbol that appears as a quote input
    pub highlighted: BTreeSet<Symbol>,
}

/// Symbols a rate can be started from, independent of the holdings.
///
/// Only quotes that survived ingestion count, so a record with a blank
/// output token does not highlight its input.
pub fn highlighted_symbols(graph: &YieldGraph) -> BTreeSet<Symbol> {
    graph.quotes().iter().map(|q| q.from.clone()).collect()
}

/// Enrich a single token. Every field of `token` is carried over; only
/// `apr`, `maxApr` and `rates` are written.
///
/// `graph` must have been built from `rates`: direct quotes are looked up
/// on the graph and copied back out of `rates` by record position.
pub fn reconcile_token(token: &TokenRecord, rates: &[RateRecord], graph: &YieldGraph) -> TokenRecord {
    let mut enriched = token.clone();

    let Some(symbol) = token.normalized_symbol() else {
        enriched.apr = Some(NOT_AVAILABLE.to_string());
        enriched.rates = Vec::new();
        return enriched;
    };

    let direct: Vec<&Quote> = graph.quotes_from(&symbol).collect();

    let best_direct = direct
        .iter()
        .filter_map(|q| q.apy)
        .fold(None, |acc: Option<f64>, apy| match acc {
            Some(a) if a >= apy => Some(a),
            _ => Some(apy),
        });

    enriched.apr = Some(match best_direct {
        Some(apy) => format_apy(apy),
        None => NOT_AVAILABLE.to_string(),
    });

    if let Some(apy) = best_reachable_apy(graph, &symbol) {
        enriched.max_apr = Some(format_apy(apy));
    }

    debug!(
        "{}: {} direct quote(s), apr {}, maxApr {}",
        symbol,
        direct.len(),
        enriched.apr.as_deref().unwrap_or(NOT_AVAILABLE),
        enriched.max_apr.as_deref().unwrap_or(NOT_AVAILABLE)
    );

    enriched.rates = direct
        .iter()
        .filter_map(|q| rates.get(q.index).cloned())
        .collect();
    enriched
}

pub fn reconcile(tokens: &[TokenRecord], rates: &[RateRecord], graph: &YieldGraph) -> Reconciliation {
    let enriched: Vec<TokenRecord> = tokens
        .iter()
        .map(|token| reconcile_token(token, rates, graph))
        .collect();

    let with_yield = enriched
        .iter()
        .filter(|t| t.apr.as_deref() != Some(NOT_AVAILABLE))
        .count();

    info!(
        "Reconciled {} tokens against {} rates ({} with a direct yield)",
        enriched.len(),
        rates.len(),
        with_yield
    );

    Reconciliation {
        tokens: enriched,
        highlighted: highlighted_symbols(graph),
    }
}
