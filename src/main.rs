//! Judgmental Engine - Main Entry Point
//!
//! Replays one decision cycle over recorded market snapshots and forecast
//! responses, placing bets on the dry-run venue.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use judgmental_engine::common::replay::{RecordedForecasts, RecordedMarkets};
use judgmental_engine::config::{load_config, load_from_env};
use judgmental_engine::evaluator::MarketEvaluator;
use judgmental_engine::risk::{LedgerSnapshot, RiskLedger, SharedLedger};
use judgmental_engine::strategy::Strategy;
use judgmental_engine::{DecisionEngine, DryRunVenue, ForecastProvider, Outcome};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Read limits from the flat .env names (MAX_BET_AMOUNT, ...) instead of the config file
    #[arg(long)]
    flat_env: bool,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// JSON array of market snapshots
    #[arg(long)]
    markets: PathBuf,

    /// JSON object mapping market id to raw forecast text
    #[arg(long)]
    forecasts: Option<PathBuf>,

    /// Account balance to size against
    #[arg(long, default_value = "1000")]
    balance: Decimal,

    /// Ledger snapshot to resume from and write back after the cycle
    #[arg(long)]
    ledger_state: Option<PathBuf>,

    /// Log bets instead of sending them anywhere
    #[arg(long, env = "DRY_RUN")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let args = Args::parse();

    let config = if args.flat_env {
        load_from_env().context("loading configuration from environment")?
    } else {
        load_config(Some(args.config.as_str())).context("loading configuration")?
    };

    // Initialize logging
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.settings.log_level.clone());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting judgmental engine");
    if args.flat_env {
        info!("Configuration: flat environment variables");
    } else {
        info!("Configuration file: {}", args.config);
    }

    if !args.dry_run {
        bail!("no live execution venue is wired into the CLI; rerun with --dry-run");
    }

    let ledger = match &args.ledger_state {
        Some(path) if path.exists() => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading ledger state {}", path.display()))?;
            let snapshot: LedgerSnapshot = serde_json::from_str(&raw)?;
            info!("Resuming with {} open positions", snapshot.positions.len());
            snapshot.restore()
        }
        _ => RiskLedger::new(config.risk.clone()),
    };

    let engine = DecisionEngine::new(
        MarketEvaluator::from_config(&config.evaluator),
        Strategy::from_config(&config.strategy)?,
        SharedLedger::new(ledger, config.strategy.min_bet),
    );

    let source = RecordedMarkets::from_json_file(&args.markets, args.balance)
        .with_context(|| format!("loading markets from {}", args.markets.display()))?;
    let forecasts = args
        .forecasts
        .as_ref()
        .map(|path| RecordedForecasts::from_json_file(path))
        .transpose()
        .context("loading forecasts")?;

    let report = engine
        .run_cycle(
            &source,
            forecasts.as_ref().map(|f| f as &dyn ForecastProvider),
            &DryRunVenue,
        )
        .await?;

    for (market_id, outcome) in &report.outcomes {
        match outcome {
            Outcome::Executed(position) => {
                info!("{}: {} {:.2}", market_id, position.side, position.amount)
            }
            Outcome::Declined(rec) => info!("{}: declined ({})", market_id, rec.reason),
            Outcome::Denied(reason) => info!("{}: denied ({})", market_id, reason),
            Outcome::BelowMinimum(amount) => info!("{}: {:.2} below minimum bet", market_id, amount),
            Outcome::NotConfirmed => info!("{}: not confirmed by venue", market_id),
            Outcome::Skipped(reason) => info!("{}: skipped ({})", market_id, reason),
            Outcome::Failed(err) => warn!("{}: failed ({})", market_id, err),
        }
    }

    let stats = engine.performance().await.statistics();
    info!("Performance: {}", serde_json::to_string(&stats)?);
    let summary = engine.portfolio_summary().await;
    info!(
        "Portfolio: {} open positions, {:.2} at risk",
        summary.open_positions, summary.total_at_risk
    );

    if let Some(path) = &args.ledger_state {
        let snapshot = engine.ledger().ledger().await.snapshot();
        std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)
            .with_context(|| format!("writing ledger state {}", path.display()))?;
        info!("Ledger state written to {}", path.display());
    }

    Ok(())
}
