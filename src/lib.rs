//! Yield Router
//!
//! Given a list of token conversion quotes and a set of holdings, work out
//! the best direct and best reachable yield per holding and describe the
//! conversion paths as a flowchart.
//!
//! - `cartographer`: rate graph construction and diagram pruning
//! - `brain`: best-yield searches and token reconciliation
//! - `diagram`: flowchart text output
//! - `engine`: the pure entry points tying it together

pub mod brain;
pub mod cartographer;
pub mod config;
pub mod diagram;
pub mod engine;
pub mod rates;
pub mod tokens;

pub use engine::{analyze, render_diagram, Analysis, DiagramRequest, EngineOptions};
pub use rates::{RateRecord, Symbol};
pub use tokens::TokenRecord;
