//! Sure-bet engine entry point.

use std::io::Read;
use std::net::SocketAddr;
use std::time::Instant;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use strum::IntoEnumIterator;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use surebet::api::{create_router, AppState};
use surebet::arbitrage::evaluate;
use surebet::config::Config;
use surebet::market::{Market, RawOdd};
use surebet::metrics;
use surebet::odds::{normalize, normalize_as, OddsFormat};
use surebet::scanner::{scan, ScanOptions};
use surebet::utils::{read_input, shutdown_signal};

/// Odds normalization and sure-bet stake allocation.
#[derive(Parser, Debug)]
#[command(name = "surebet")]
#[command(about = "Detect sure-bets across bookmaker odds and split a stake to lock in profit")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one market (JSON) and print the result.
    Evaluate {
        /// Market file, or "-" for stdin.
        #[arg(short, long, default_value = "-")]
        file: String,

        /// Total stake to split (defaults to DEFAULT_STAKE).
        #[arg(short, long)]
        stake: Option<Decimal>,
    },

    /// Convert one price to decimal and every other notation.
    Convert {
        /// Raw price, e.g. 2.50, 5/2, +150, -125, 0.85.
        #[arg(allow_hyphen_values = true)]
        odd: String,

        /// Read the price in this notation instead of detecting it.
        #[arg(short, long)]
        format: Option<OddsFormat>,
    },

    /// Evaluate a JSON-lines feed of markets.
    Scan {
        /// Feed file, or "-" for stdin.
        #[arg(short, long, default_value = "-")]
        file: String,

        /// Total stake per market (defaults to DEFAULT_STAKE).
        #[arg(short, long)]
        stake: Option<Decimal>,

        /// Drop sure-bets below this profit percentage (defaults to MIN_PROFIT_PCT).
        #[arg(long)]
        min_profit_pct: Option<Decimal>,

        /// Only emit sure-bets.
        #[arg(long)]
        only_surebets: bool,
    },

    /// Run the HTTP API (default).
    Serve {
        /// HTTP server port (defaults to PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,
}

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging (stderr, stdout carries results)
    let filter = if args.verbose {
        EnvFilter::new("surebet=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }

    let config = load_config()?;

    match args.command {
        Some(Command::Evaluate { file, stake }) => cmd_evaluate(&config, &file, stake),
        Some(Command::Convert { odd, format }) => cmd_convert(&config, &odd, format),
        Some(Command::Scan {
            file,
            stake,
            min_profit_pct,
            only_surebets,
        }) => cmd_scan(&config, &file, stake, min_profit_pct, only_surebets),
        Some(Command::Serve { port }) => cmd_serve(&config, port),
        Some(Command::CheckConfig) => cmd_check_config(&config),
        None => cmd_serve(&config, None),
    }
}

/// Load and validate configuration.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    Ok(config)
}

/// Evaluate a single market.
fn cmd_evaluate(config: &Config, file: &str, stake: Option<Decimal>) -> anyhow::Result<()> {
    let mut raw = String::new();
    read_input(file)?.read_to_string(&mut raw)?;
    let market: Market = serde_json::from_str(&raw)?;

    let stake = stake.unwrap_or(config.default_stake);
    let start = Instant::now();
    let result = evaluate(&market, stake, &config.evaluator_settings())?;
    metrics::record_evaluation(&result, start);

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Show a price in every notation.
fn cmd_convert(config: &Config, odd: &str, format: Option<OddsFormat>) -> anyhow::Result<()> {
    let settings = config.evaluator_settings();
    let raw = RawOdd::from(odd);

    let normalized = match format {
        Some(f) => normalize_as(&raw, f, &settings.odds),
        None => normalize(&raw, &settings.odds),
    }?;

    println!("======================================================================");
    println!("Input:               {}", odd);
    println!("Notation:            {}", normalized.format);
    println!("Decimal:             {:.4}", normalized.decimal);
    println!(
        "Implied probability: {:.2}%",
        normalized.implied_probability() * 100.0
    );
    println!("----------------------------------------------------------------------");
    for f in OddsFormat::iter() {
        println!("  {:<12} {}", f.to_string(), normalized.express(f));
    }
    println!("======================================================================");

    Ok(())
}

/// Evaluate a feed of markets.
fn cmd_scan(
    config: &Config,
    file: &str,
    stake: Option<Decimal>,
    min_profit_pct: Option<Decimal>,
    only_surebets: bool,
) -> anyhow::Result<()> {
    let options = ScanOptions {
        total_stake: stake.unwrap_or(config.default_stake),
        min_profit_pct: min_profit_pct.unwrap_or(config.min_profit_pct),
        only_surebets,
    };

    let reader = read_input(file)?;
    let stdout = std::io::stdout();
    let tally = scan(reader, stdout.lock(), &config.evaluator_settings(), &options)?;

    eprintln!("{}", tally);
    Ok(())
}

/// Run the HTTP API until shutdown.
fn cmd_serve(config: &Config, port: Option<u16>) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve(config, port))
}

async fn serve(config: &Config, port: Option<u16>) -> anyhow::Result<()> {
    let handle = metrics::install_prometheus().map_err(|e| anyhow::anyhow!(e))?;

    let state = AppState::new(config.evaluator_settings(), config.default_stake)
        .with_prometheus(handle);
    let router = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port.unwrap_or(config.port)));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    info!(
        "Guardrail: [{}, {}], american tie-break: >= {} step {}",
        config.decimal_min, config.decimal_max, config.american_threshold, config.american_step
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("SUREBET - CONFIGURATION CHECK");
    println!("======================================================================");
    println!("Configuration Summary:");
    println!("  Decimal Range: [{}, {}]", config.decimal_min, config.decimal_max);
    println!(
        "  American Tie-Break: integers >= {} divisible by {}",
        config.american_threshold, config.american_step
    );
    println!(
        "  High Margin Threshold: {}%",
        config.high_margin_threshold * 100.0
    );
    println!("  Default Stake: ${}", config.default_stake);
    println!("  Min Profit: {}%", config.min_profit_pct);
    println!("  Port: {}", config.port);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}
