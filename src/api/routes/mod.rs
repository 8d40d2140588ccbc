//! API Routes Module
//!
//! Route handlers organized by domain:
//! - health: Health check and tracker statistics
//! - payments: Address lookups, payment checks and the LTC/USD rate
//! - deposits: Deposit registration and lookup

pub mod deposits;
pub mod health;
pub mod payments;

use axum::{http::StatusCode, response::IntoResponse, Json};

/// JSON error body shared by all handlers
pub(crate) fn error_response(
    status: StatusCode,
    error: &str,
    details: String,
) -> axum::response::Response {
    (
        status,
        Json(serde_json::json!({
            "error": error,
            "details": details
        })),
    )
        .into_response()
}
