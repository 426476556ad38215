//! Phase 1: The Cartographer (Data Ingest)
//!
//! Builds the yield graph from a rate list and bounds the full diagram
//! to paths that end on a display token.

mod fetcher;
mod graph;
mod pruner;

pub use fetcher::{load_rates_file, load_tokens_file, parse_rates, RateFetcher};
pub use graph::{PairQuote, PairQuotes, YieldGraph};
pub use pruner::{prune, reverse_reachable, PrunedGraph};
