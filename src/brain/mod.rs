//! Phase 2: The Brain
//!
//! Responsible for:
//! - Best reachable yield per symbol and source-rooted best paths
//! - Folding those yields back into the token holdings

mod estimator;
mod reconciler;

pub use estimator::{best_reachable_apy, BestPathSearch, BestPathSubgraph, DEFAULT_MAX_RELAXATIONS};
pub use reconciler::{highlighted_symbols, reconcile, reconcile_token, Reconciliation, NOT_AVAILABLE};
