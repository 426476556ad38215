//! Rate and holdings sources
//!
//! The engine itself never does I/O. These helpers feed it: rates from the
//! quoting endpoint or a JSON file, holdings from a JSON file.

use eyre::{eyre, Result, WrapErr};
use reqwest::Client;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::rates::RateRecord;
use crate::tokens::TokenRecord;

/// The endpoint answers either with a bare list or wrapped in `{"rates": [...]}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RatesResponse {
    List(Vec<RateRecord>),
    Wrapped { rates: Vec<RateRecord> },
}

impl RatesResponse {
    fn into_rates(self) -> Vec<RateRecord> {
        match self {
            RatesResponse::List(rates) => rates,
            RatesResponse::Wrapped { rates } => rates,
        }
    }
}

pub struct RateFetcher {
    http_client: Client,
    rates_url: String,
}

impl RateFetcher {
    pub fn new(rates_url: &str, timeout_secs: u64) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .wrap_err("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            rates_url: rates_url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.rates_url
    }

    /// GET the rate list from the quoting endpoint.
    pub async fn fetch_rates(&self) -> Result<Vec<RateRecord>> {
        let start = Instant::now();

        let response = self
            .http_client
            .get(&self.rates_url)
            .send()
            .await
            .wrap_err_with(|| format!("Failed to fetch rates from {}", self.rates_url))?;

        if !response.status().is_success() {
            return Err(eyre!(
                "Rates endpoint {} returned {}",
                self.rates_url,
                response.status()
            ));
        }

        let body = response.text().await?;
        let rates = parse_rates(&body)?;

        info!(
            "Fetched {} rates from {} in {:?}",
            rates.len(),
            self.rates_url,
            start.elapsed()
        );

        Ok(rates)
    }
}

pub fn parse_rates(body: &str) -> Result<Vec<RateRecord>> {
    let response: RatesResponse =
        serde_json::from_str(body).wrap_err("Rates payload is not a rate list")?;
    Ok(response.into_rates())
}

pub fn load_rates_file<P: AsRef<Path>>(path: P) -> Result<Vec<RateRecord>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read rates file {}", path.display()))?;
    let rates = parse_rates(&content)?;
    debug!("Loaded {} rates from {}", rates.len(), path.display());
    Ok(rates)
}

pub fn load_tokens_file<P: AsRef<Path>>(path: P) -> Result<Vec<TokenRecord>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read tokens file {}", path.display()))?;
    let tokens: Vec<TokenRecord> = serde_json::from_str(&content)
        .wrap_err_with(|| format!("{} is not a token list", path.display()))?;
    debug!("Loaded {} tokens from {}", tokens.len(), path.display());
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_and_wrapped() {
        let bare = r#"[{"input_symbol": "ETH", "output_token": "stETH", "output_kind": "stake", "apy": 3.5}]"#;
        let wrapped = r#"{"rates": [{"input_symbol": "ETH", "output_token": "stETH", "output_kind": "stake", "apy": 3.5}]}"#;

        let a = parse_rates(bare).unwrap();
        let b = parse_rates(wrapped).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].apy, Some(3.5));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_rates(r#"{"status": "down"}"#).is_err());
        assert!(parse_rates("not json").is_err());
    }

    #[test]
    fn test_load_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();

        let rates_path = dir.join("rates.json");
        fs::write(
            &rates_path,
            r#"[{"input_symbol": "ETH", "output_token": "ezETH", "output_kind": "restake", "apy": 4.1, "project_link": "https://renzo.example"}]"#,
        )
        .unwrap();
        let rates = load_rates_file(&rates_path).unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].project_link.as_deref(), Some("https://renzo.example"));

        let tokens_path = dir.join("tokens.json");
        fs::write(&tokens_path, r#"[{"id": 1, "name": "Ether", "symbol": "ETH", "quantity": "1.0"}]"#).unwrap();
        let tokens = load_tokens_file(&tokens_path).unwrap();
        assert_eq!(tokens[0].symbol, "ETH");

        assert!(load_tokens_file(dir.join("missing.json")).is_err());
    }

    #[test]
    fn test_fetcher_keeps_url() {
        let fetcher = RateFetcher::new("http://localhost:3000/rates", 5).unwrap();
        assert_eq!(fetcher.url(), "http://localhost:3000/rates");
    }
}
