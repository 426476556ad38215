//! Rate quotes - the raw input of the router
//!
//! A rate record says "converting `input_symbol` into `output_token` via
//! `output_kind` earns `apy`". Quotes arrive from an external endpoint and
//! are normalized exactly once, here, before any graph work happens.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// A token symbol, trimmed and uppercased.
///
/// Every symbol comparison in the crate goes through this type, so
/// `stETH`, `STETH` and ` steth ` all land on the same graph node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Normalize a raw symbol. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One quote as delivered by the rates endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    #[serde(default)]
    pub input_symbol: String,
    #[serde(default)]
    pub output_token: String,
    #[serde(default)]
    pub output_kind: String,
    /// Missing, null, non-numeric and NaN values all become `None`
    #[serde(default, deserialize_with = "lenient_apy")]
    pub apy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_icon: Option<String>,
}

impl RateRecord {
    pub fn new(input_symbol: &str, output_token: &str, output_kind: &str, apy: Option<f64>) -> Self {
        Self {
            input_symbol: input_symbol.to_string(),
            output_token: output_token.to_string(),
            output_kind: output_kind.to_string(),
            apy,
            project_link: None,
            from_icon: None,
        }
    }

    /// The apy if it can take part in a "best" computation.
    pub fn usable_apy(&self) -> Option<f64> {
        self.apy.filter(|v| v.is_finite())
    }
}

/// A rate record after ingestion: symbols normalized, bad apy filtered out.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Position of the source record in the rate list
    pub index: usize,
    pub from: Symbol,
    pub to: Symbol,
    pub kind: String,
    pub apy: Option<f64>,
}

/// Normalize a rate list. Records with a blank symbol on either side are
/// dropped; everything else keeps its input order.
pub fn ingest(rates: &[RateRecord]) -> Vec<Quote> {
    let mut quotes = Vec::with_capacity(rates.len());
    let mut dropped = 0usize;

    for (index, rate) in rates.iter().enumerate() {
        let (Some(from), Some(to)) = (Symbol::parse(&rate.input_symbol), Symbol::parse(&rate.output_token)) else {
            dropped += 1;
            debug!(
                "Dropping rate with blank symbol: {:?} -> {:?}",
                rate.input_symbol, rate.output_token
            );
            continue;
        };

        quotes.push(Quote {
            index,
            from,
            to,
            kind: rate.output_kind.clone(),
            apy: rate.usable_apy(),
        });
    }

    if dropped > 0 {
        debug!("Ingested {} quotes, dropped {} malformed", quotes.len(), dropped);
    }

    quotes
}

/// Render an apy the way every output of the router shows it: `3.50%`.
pub fn format_apy(apy: f64) -> String {
    format!("{:.2}%", apy)
}

fn lenient_apy<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|v| v.is_finite()))
}
