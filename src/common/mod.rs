//! Common Infrastructure Module
//!
//! This module contains:
//! - Configuration loading from environment variables
//! - Structured logging setup and transaction events
//! - The root error type

pub mod config;
pub mod error;
pub mod logging;

// Re-exports for convenience
pub use config::{ConfigError, Network, ServiceConfig};
pub use error::{PaymentsError, Result};
pub use logging::{
    init_from_config, init_logging, log_transaction_event, LogLevel, LoggingError,
    TransactionEvent,
};
