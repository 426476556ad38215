//! Configuration for the router
//!
//! Loaded from environment variables (and `.env`) or a TOML file.

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::brain::DEFAULT_MAX_RELAXATIONS;
use crate::diagram::DEFAULT_HEADER;
use crate::engine::EngineOptions;
use crate::tokens::{display_set, DISPLAY_TOKENS};

// ============================================
// MAIN CONFIGURATION
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // ========== Rate Source ==========
    /// Quoting endpoint returning the rate list
    pub rates_url: String,

    /// HTTP timeout for the rates endpoint
    pub request_timeout_secs: u64,

    // ========== Diagram ==========
    /// Tokens allowed to terminate an edge of the full diagram
    pub display_tokens: Vec<String>,

    /// First line of every diagram
    pub diagram_header: String,

    // ========== Path Finding ==========
    /// Hard stop for the source-rooted best path search
    pub max_relaxations: usize,
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            rates_url: env::var("RATES_URL").unwrap_or(defaults.rates_url),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            display_tokens: env::var("DISPLAY_TOKENS")
                .map(|s| {
                    s.split(',')
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.display_tokens),
            diagram_header: env::var("DIAGRAM_HEADER").unwrap_or(defaults.diagram_header),
            max_relaxations: env::var("MAX_RELAXATIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_relaxations),
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.rates_url.starts_with("http://") || self.rates_url.starts_with("https://")) {
            return Err(eyre::eyre!("RATES_URL must be an http(s) URL (got {:?})", self.rates_url));
        }

        if self.request_timeout_secs == 0 {
            return Err(eyre::eyre!("REQUEST_TIMEOUT_SECS must be at least 1"));
        }

        if display_set(&self.display_tokens).is_empty() {
            return Err(eyre::eyre!("DISPLAY_TOKENS must name at least one token"));
        }

        if self.diagram_header.trim().is_empty() {
            return Err(eyre::eyre!("DIAGRAM_HEADER must not be empty"));
        }

        if self.max_relaxations == 0 {
            return Err(eyre::eyre!("MAX_RELAXATIONS must be at least 1"));
        }

        Ok(())
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            display_tokens: display_set(&self.display_tokens),
            max_relaxations: self.max_relaxations,
            diagram_header: self.diagram_header.trim().to_string(),
        }
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║              YIELD ROUTER - CONFIGURATION                  ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ Rates URL:         {:<40} ║", self.rates_url);
        println!("║ Timeout:           {:<38} s ║", self.request_timeout_secs);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ • Display Tokens:  {:<40} ║", self.display_tokens.len());
        println!("║ • Diagram Header:  {:<40} ║", self.diagram_header);
        println!("║ • Max Relaxations: {:<40} ║", self.max_relaxations);
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rates_url: "http://localhost:3000/rates".to_string(),
            request_timeout_secs: 10,
            display_tokens: DISPLAY_TOKENS.iter().map(|s| s.to_string()).collect(),
            diagram_header: DEFAULT_HEADER.to_string(),
            max_relaxations: DEFAULT_MAX_RELAXATIONS,
        }
    }
}

// ============================================
// TESTS
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::Symbol;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_relaxations, DEFAULT_MAX_RELAXATIONS);
        assert_eq!(config.display_tokens.len(), DISPLAY_TOKENS.len());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.display_tokens = vec!["  ".to_string()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.max_relaxations = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rates_url = "localhost:3000/rates".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.diagram_header = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_engine_options_normalize_display_tokens() {
        let mut config = Config::default();
        config.display_tokens = vec!["wstETH".to_string(), "WSTETH".to_string(), "ezEth".to_string()];
        let options = config.engine_options();

        assert_eq!(options.display_tokens.len(), 2);
        assert!(options.display_tokens.contains(&Symbol::parse("EZETH").unwrap()));
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.toml");

        let mut config = Config::default();
        config.max_relaxations = 42;
        config.diagram_header = "graph LR".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.max_relaxations, 42);
        assert_eq!(loaded.diagram_header, "graph LR");
        assert_eq!(loaded.display_tokens, config.display_tokens);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("max_relaxations = 7\n").unwrap();
        assert_eq!(config.max_relaxations, 7);
        assert_eq!(config.rates_url, "http://localhost:3000/rates");
    }
}
