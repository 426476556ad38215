//! Diagram rendering
//!
//! Writes a node/edge set as a mermaid-style flowchart:
//!
//! ```text
//! graph TD
//!     STETH["STETH (3.50%)"]
//!     WSTETH["WSTETH (3.60%)"]
//!     STETH -->|swap| WSTETH
//! ```

use std::collections::HashMap;

use crate::rates::{format_apy, Symbol};

pub const DEFAULT_HEADER: &str = "graph TD";

const INDENT: &str = "    ";

/// One drawn edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramEdge {
    pub from: Symbol,
    pub to: Symbol,
    pub label: String,
}

/// Renders node and edge lists. Node order is taken as given: the caller
/// passes sorted nodes for the full graph and path order for a subgraph.
pub struct DiagramRenderer<'a> {
    header: &'a str,
    target_apy: &'a HashMap<Symbol, f64>,
}

impl<'a> DiagramRenderer<'a> {
    pub fn new(header: &'a str, target_apy: &'a HashMap<Symbol, f64>) -> Self {
        Self { header, target_apy }
    }

    pub fn render<'n, I>(&self, nodes: I, edges: &[DiagramEdge]) -> String
    where
        I: IntoIterator<Item = &'n Symbol>,
    {
        let mut lines = vec![self.header.to_string()];

        for node in nodes {
            lines.push(format!("{}{}[\"{}\"]", INDENT, node, self.node_label(node)));
        }

        for edge in edges {
            let label = escape_label(&edge.label);
            if label.is_empty() {
                lines.push(format!("{}{} --> {}", INDENT, edge.from, edge.to));
            } else {
                lines.push(format!("{}{} -->|{}| {}", INDENT, edge.from, label, edge.to));
            }
        }

        lines.join("\n")
    }

    fn node_label(&self, node: &Symbol) -> String {
        match self.target_apy.get(node) {
            Some(&apy) => format!("{} ({})", node, format_apy(apy)),
            None => node.to_string(),
        }
    }
}

fn escape_label(label: &str) -> String {
    label.replace('"', "\\\"")
}
