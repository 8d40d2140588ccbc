//! Structured Logging
//!
//! Provides:
//! - JSON output for log aggregation (mainnet) and pretty output for development
//! - Structured transaction events for deposit/payment state transitions
//!
//! # Usage
//!
//! ```rust,ignore
//! use ltc_payments::common::logging::{init_logging, log_transaction_event, LogLevel};
//!
//! init_logging(LogLevel::Info, true)?;
//!
//! log_transaction_event("deposit_abc", "ltc1q...", amount, "CONFIRMED", "Deposit confirmed", LogLevel::Info);
//! ```

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Tracing target for transaction events
pub const DEPOSIT_TARGET: &str = "ltc_payments::deposit";

// ============================================================================
// Log Levels
// ============================================================================

/// Application log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl From<&str> for LogLevel {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

// ============================================================================
// Transaction Events
// ============================================================================

/// One state transition of a deposit or payment
#[derive(Debug, Clone, Serialize)]
pub struct TransactionEvent {
    /// Event timestamp (RFC 3339)
    pub timestamp: String,
    /// Order or deposit reference
    pub order_id: String,
    pub address: String,
    /// Amount in LTC
    pub amount: Decimal,
    /// Short machine-readable status, e.g. "CONFIRMED"
    pub status: String,
    pub message: String,
    pub level: String,
}

impl TransactionEvent {
    pub fn new(
        order_id: impl Into<String>,
        address: impl Into<String>,
        amount: Decimal,
        status: impl Into<String>,
        message: impl Into<String>,
        level: LogLevel,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            order_id: order_id.into(),
            address: address.into(),
            amount,
            status: status.into(),
            message: message.into(),
            level: level.as_str().to_string(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                "{{\"error\": \"failed to serialize event\", \"message\": \"{}\"}}",
                self.message
            )
        })
    }
}

/// Emit a transaction event at the given level
pub fn log_transaction_event(
    order_id: &str,
    address: &str,
    amount: Decimal,
    status: &str,
    message: &str,
    level: LogLevel,
) -> TransactionEvent {
    let event = TransactionEvent::new(order_id, address, amount, status, message, level);
    let json = event.to_json();

    match level {
        LogLevel::Trace => tracing::trace!(target: DEPOSIT_TARGET, "Transaction event: {}", json),
        LogLevel::Debug => tracing::debug!(target: DEPOSIT_TARGET, "Transaction event: {}", json),
        LogLevel::Info => tracing::info!(target: DEPOSIT_TARGET, "Transaction event: {}", json),
        LogLevel::Warn => tracing::warn!(target: DEPOSIT_TARGET, "Transaction event: {}", json),
        LogLevel::Error => tracing::error!(target: DEPOSIT_TARGET, "Transaction event: {}", json),
    }

    event
}

// ============================================================================
// Initialization
// ============================================================================

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_logging(level: LogLevel, json_format: bool) -> Result<(), LoggingError> {
    let level_name = level.as_str().to_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "ltc_payments={},tower_http={},axum={}",
            level_name, level_name, level_name
        ))
    });

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .map_err(|e| LoggingError::InitFailed(e.to_string()))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()
            .map_err(|e| LoggingError::InitFailed(e.to_string()))?;
    }

    Ok(())
}

/// Initialize logging from ServiceConfig (JSON on mainnet)
pub fn init_from_config(config: &super::config::ServiceConfig) -> Result<(), LoggingError> {
    let level = LogLevel::from(config.log_level.as_str());
    let json_format = config.network == super::config::Network::Mainnet;

    init_logging(level, json_format)
}

/// Logging errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to initialize logging: {0}")]
    InitFailed(String),
}
