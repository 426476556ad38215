//! Yield Router - best yield per holding plus a conversion flowchart
//!
//! Run with: cargo run -- --test-data
//!
//! Rates come from `--rates <file>` or the quoting endpoint (`RATES_URL`),
//! holdings from `--tokens <file>` or the built-in test data.

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use console::style;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yield_router::brain::NOT_AVAILABLE;
use yield_router::cartographer::{load_rates_file, load_tokens_file, RateFetcher};
use yield_router::config::Config;
use yield_router::engine::{analyze, Analysis, DiagramRequest};
use yield_router::tokens::mock_holdings;
use yield_router::{RateRecord, TokenRecord};

#[derive(Debug, Parser)]
#[command(name = "yield-router", version, about = "Best yield per token and conversion flowchart")]
struct Args {
    /// Rate list as JSON; fetched from RATES_URL when omitted
    #[arg(long)]
    rates: Option<PathBuf>,

    /// Holdings as JSON
    #[arg(long, conflicts_with = "test_data")]
    tokens: Option<PathBuf>,

    /// Use the built-in mock holdings
    #[arg(long)]
    test_data: bool,

    /// Draw best paths out of this symbol instead of the full graph
    #[arg(long)]
    from: Option<String>,

    /// TOML config file; environment variables are used otherwise
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print one JSON document instead of the human report
    #[arg(long)]
    json: bool,
}

fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!("{}", style(" 🧭 YIELD ROUTER - Best Yield per Token").cyan().bold());
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

async fn load_rates(args: &Args, config: &Config) -> Result<Vec<RateRecord>> {
    match &args.rates {
        Some(path) => load_rates_file(path),
        None => {
            let fetcher = RateFetcher::new(&config.rates_url, config.request_timeout_secs)?;
            fetcher.fetch_rates().await
        }
    }
}

fn load_tokens(args: &Args) -> Result<Vec<TokenRecord>> {
    match &args.tokens {
        Some(path) => load_tokens_file(path),
        None if args.test_data => Ok(mock_holdings()),
        None => Err(eyre!("No holdings given: pass --tokens <file> or --test-data")),
    }
}

fn print_report(analysis: &Analysis) {
    println!("{}", style("═══ HOLDINGS ═══").blue().bold());
    println!();
    println!("  {:<28} {:>14} {:>12} {:>12}", "Token", "Quantity", "APR", "Max APR");
    for token in &analysis.tokens {
        let quantity = match &token.quantity {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        println!(
            "  {:<28} {:>14} {:>12} {:>12}",
            format!("{} ({})", token.name, token.symbol),
            quantity,
            token.apr.as_deref().unwrap_or(NOT_AVAILABLE),
            token.max_apr.as_deref().unwrap_or(NOT_AVAILABLE)
        );
    }

    println!();
    let highlighted: Vec<String> = analysis.highlighted.iter().map(|s| s.to_string()).collect();
    println!("{} {}", style("Rate inputs:").dim(), highlighted.join(", "));

    println!();
    println!("{}", style("═══ DIAGRAM ═══").magenta().bold());
    println!();
    println!("{}", analysis.diagram);
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("yield_router=info".parse()?),
        )
        .init();

    if !args.json {
        print_banner();
    }

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(e);
    }

    if !args.json {
        config.print_summary();
        println!();
    }

    let start = Instant::now();
    let rates = load_rates(&args, &config).await?;
    let tokens = load_tokens(&args)?;
    let options = config.engine_options();

    let request = match &args.from {
        Some(source) => DiagramRequest::BestPathsFrom(source.clone()),
        None => DiagramRequest::Full,
    };
    let analysis = analyze(&rates, &tokens, &request, &options);

    info!(
        "Routed {} tokens over {} rates in {:?}",
        analysis.tokens.len(),
        rates.len(),
        start.elapsed()
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_report(&analysis);
    }

    Ok(())
}
