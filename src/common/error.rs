//! Common Error Types
//!
//! Root error type used by the binary; library modules keep their own enums.

use thiserror::Error;

use crate::deposit_tracker::TrackerError;
use crate::explorer::ExplorerError;
use crate::payment::PaymentError;
use crate::storage::StorageError;

/// Root error type for the LTC payments service
#[derive(Debug, Error)]
pub enum PaymentsError {
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),

    #[error("logging error: {0}")]
    Logging(#[from] super::logging::LoggingError),

    #[error("explorer error: {0}")]
    Explorer(#[from] ExplorerError),

    #[error("payment error: {0}")]
    Payment(#[from] PaymentError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PaymentsError {
    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        match self {
            PaymentsError::Explorer(e) => e.is_transient(),
            PaymentsError::Storage(StorageError::Connection(_)) => true,
            PaymentsError::Tracker(e) => e.is_transient(),
            PaymentsError::Io(_) => true,
            _ => false,
        }
    }

    /// Get error code for API responses and logs
    pub fn error_code(&self) -> &'static str {
        match self {
            PaymentsError::Config(_) => "CONFIG_ERROR",
            PaymentsError::Logging(_) => "LOGGING_ERROR",
            PaymentsError::Explorer(_) => "EXPLORER_ERROR",
            PaymentsError::Payment(_) => "PAYMENT_ERROR",
            PaymentsError::Storage(_) => "STORAGE_ERROR",
            PaymentsError::Tracker(_) => "TRACKER_ERROR",
            PaymentsError::Io(_) => "IO_ERROR",
        }
    }
}

/// Result type alias using PaymentsError
pub type Result<T> = std::result::Result<T, PaymentsError>;
