//! Token definitions for the router
//!
//! - `TokenRecord`: a holding supplied by the wallet side, enriched here
//! - The canonical display set (tokens allowed to terminate a diagram path)
//! - Mock holdings for test data mode

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::rates::{RateRecord, Symbol};

/// A token holding. Fields the router does not know about are kept in
/// `extra` and written back out untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub quantity: Value,
    #[serde(default)]
    pub suggestions: Value,

    /// Best direct yield, e.g. `"3.50%"`, or `"N/A"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apr: Option<String>,

    /// Best yield found anywhere downstream of this token
    #[serde(rename = "maxApr", default, skip_serializing_if = "Option::is_none")]
    pub max_apr: Option<String>,

    /// Rates whose input is this token; always written, empty when none match
    #[serde(default)]
    pub rates: Vec<RateRecord>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenRecord {
    pub fn new(id: u64, name: &str, symbol: &str, quantity: &str) -> Self {
        Self {
            id: Value::from(id),
            name: name.to_string(),
            symbol: symbol.to_string(),
            quantity: Value::from(quantity),
            suggestions: Value::Null,
            apr: None,
            max_apr: None,
            rates: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn normalized_symbol(&self) -> Option<Symbol> {
        Symbol::parse(&self.symbol)
    }
}

// ============================================
// CANONICAL DISPLAY TOKENS
// ============================================

/// Symbols with a known icon. Only edges landing on one of these appear
/// in the full diagram.
pub const DISPLAY_TOKENS: &[&str] = &[
    "ETH", "WETH", "stETH", "wstETH", "ezETH", "pzETH", "STONE", "xPufETH",
    "mstETH", "weETH", "egETH", "inwstETH", "rsETH", "LsETH", "USDC", "USDT",
    "USDe", "FBTC", "LBTC", "mBTC", "pumpBTC", "mswETH", "mwBETH", "mETH",
    "rstETH", "steakLRT", "Re7LRT", "amphrETH", "rswETH", "swETH", "weETHs",
];

lazy_static! {
    static ref DEFAULT_DISPLAY_SET: HashSet<Symbol> = display_set(DISPLAY_TOKENS);
}

/// Normalize a list of raw symbols into a display set.
pub fn display_set<S: AsRef<str>>(symbols: &[S]) -> HashSet<Symbol> {
    symbols
        .iter()
        .filter_map(|s| Symbol::parse(s.as_ref()))
        .collect()
}

pub fn default_display_set() -> HashSet<Symbol> {
    DEFAULT_DISPLAY_SET.clone()
}

// ============================================
// TEST DATA MODE
// ============================================

/// Holdings used when no wallet is connected.
pub fn mock_holdings() -> Vec<TokenRecord> {
    vec![
        TokenRecord::new(1, "Ether", "ETH", "1.25"),
        TokenRecord::new(2, "Wrapped liquid staked Ether", "wstETH", "0.8"),
        TokenRecord::new(3, "Tether USD", "USDT", "1500"),
        TokenRecord::new(4, "Wrapped BTC", "WBTC", "0.05"),
        TokenRecord::new(5, "Dai Stablecoin", "DAI", "250"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_set_is_normalized() {
        let set = default_display_set();
        assert_eq!(set.len(), DISPLAY_TOKENS.len(), "no collisions after uppercasing");
        assert!(set.contains(&Symbol::parse("steth").unwrap()));
        assert!(set.contains(&Symbol::parse("WSTETH").unwrap()));
        assert!(!set.contains(&Symbol::parse("DAI").unwrap()));
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let json = r#"{"id": 7, "name": "Ether", "symbol": "ETH", "quantity": "2", "chain": "zircuit", "maxApr": "1.00%"}"#;
        let token: TokenRecord = serde_json::from_str(json).unwrap();
        assert_eq!(token.max_apr.as_deref(), Some("1.00%"));
        assert_eq!(token.extra.get("chain"), Some(&Value::from("zircuit")));

        let back = serde_json::to_value(&token).unwrap();
        assert_eq!(back["chain"], "zircuit");
        assert_eq!(back["maxApr"], "1.00%");
        assert_eq!(back["id"], 7);
    }

    #[test]
    fn test_mock_holdings() {
        let holdings = mock_holdings();
        assert_eq!(holdings.len(), 5);
        assert!(holdings.iter().all(|t| t.apr.is_none() && t.max_apr.is_none()));
    }
}
