//! LTC Payments - Service Binary
//!
//! Run modes:
//!   ltc-payments monitor                 - Reconcile pending deposits (background)
//!   ltc-payments api [--port <port>]     - REST API plus the deposit monitor
//!   ltc-payments check <address> <amt>   - One-off payment check
//!
//! Configuration comes from the environment (and `.env` when present).

use ltc_payments::api::{self, AppState};
use ltc_payments::common::{self, PaymentsError, ServiceConfig};
use ltc_payments::deposit_tracker::{DepositMonitor, TrackerConfig};
use ltc_payments::explorer::ExplorerClient;
use ltc_payments::payment::PaymentMatcher;
use ltc_payments::rates::RateOracle;
use ltc_payments::storage::{DepositStore, SqliteDepositStore};
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let result = match args[1].as_str() {
        "monitor" => run_monitor().await,
        "api" => run_api(&args[2..]).await,
        "check" => run_check(&args[2..]).await,
        _ => {
            print_usage();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error [{}]: {}", e.error_code(), e);
        std::process::exit(1);
    }
}

fn print_usage() {
    println!("LTC Payments - Litecoin payment detection and deposit reconciliation");
    println!();
    println!("Usage:");
    println!("  ltc-payments monitor                      Reconcile pending deposits");
    println!("  ltc-payments api [--port <port>]          Start REST API and monitor (default: 3002)");
    println!("  ltc-payments check <address> <amount>     Check an address for a payment in LTC");
    println!();
    println!("Environment Variables:");
    println!("  LTC_NETWORK                 mainnet | testnet (default: mainnet)");
    println!("  LTC_EXPLORER_URL            Explorer API base URL");
    println!("  LTC_PRICE_URL               LTC/USD quote URL");
    println!("  LTC_REQUIRED_CONFIRMATIONS  Confirmations before crediting (default: 3)");
    println!("  LTC_POLL_INTERVAL_SECS      Monitor interval (default: 60)");
    println!("  LTC_CACHE_FLUSH_SECS        Explorer cache flush interval (default: 600)");
    println!("  LTC_RATE_TTL_SECS           Rate cache lifetime (default: 3600)");
    println!("  LTC_FALLBACK_RATE           Rate used before the first quote (default: 50)");
    println!("  LTC_DB_PATH                 SQLite database (default: data/deposits.db)");
    println!("  LTC_API_PORT                REST API port (default: 3002)");
    println!("  LTC_LOG_LEVEL               trace | debug | info | warn | error");
}

fn load_config() -> Result<ServiceConfig, PaymentsError> {
    let config = ServiceConfig::from_env()?;
    common::init_from_config(&config)?;
    Ok(config)
}

fn build_monitor(
    config: &ServiceConfig,
    explorer: Arc<ExplorerClient>,
    store: Arc<dyn DepositStore>,
) -> DepositMonitor {
    DepositMonitor::new(explorer, store, TrackerConfig::from(config))
}

async fn run_monitor() -> Result<(), PaymentsError> {
    let config = load_config()?;
    config.print_summary();

    let explorer = Arc::new(ExplorerClient::from_config(&config));
    let store: Arc<dyn DepositStore> = Arc::new(SqliteDepositStore::new(&config.db_path)?);
    let monitor = build_monitor(&config, explorer, store);

    println!("Press Ctrl+C to stop");

    tokio::select! {
        _ = monitor.run() => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutdown requested");
        }
    }

    info!("Final stats: {}", monitor.stats().await);
    Ok(())
}

async fn run_api(args: &[String]) -> Result<(), PaymentsError> {
    let mut config = load_config()?;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--port" if i + 1 < args.len() => {
                config.api_port = args[i + 1].parse().map_err(|_| {
                    common::ConfigError::InvalidValue("--port".to_string(), args[i + 1].clone())
                })?;
                i += 2;
            }
            _ => i += 1,
        }
    }
    config.print_summary();

    let explorer = Arc::new(ExplorerClient::from_config(&config));
    let store: Arc<dyn DepositStore> = Arc::new(SqliteDepositStore::new(&config.db_path)?);
    let monitor = build_monitor(&config, explorer.clone(), store.clone());

    let matcher =
        PaymentMatcher::new(explorer).with_required_confirmations(config.required_confirmations);
    let rates = Arc::new(RateOracle::from_config(&config));
    let state = AppState::new(matcher, rates, store, monitor.stats_handle());

    tokio::select! {
        served = api::start_server(state, config.api_port) => served?,
        _ = monitor.run() => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutdown requested");
        }
    }

    Ok(())
}

async fn run_check(args: &[String]) -> Result<(), PaymentsError> {
    let (address, amount) = match args {
        [address, amount, ..] => (address, amount),
        _ => {
            print_usage();
            return Ok(());
        }
    };
    let amount = Decimal::from_str(amount).map_err(|_| {
        common::ConfigError::InvalidValue("amount".to_string(), amount.to_string())
    })?;

    let config = load_config()?;
    let explorer = Arc::new(ExplorerClient::from_config(&config));
    let matcher =
        PaymentMatcher::new(explorer).with_required_confirmations(config.required_confirmations);

    let result = matcher.try_check_payment(address, amount).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&result).unwrap_or_else(|_| format!("{:?}", result))
    );
    Ok(())
}
