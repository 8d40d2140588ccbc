//! Deposit endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::error;

use super::error_response;
use crate::api::server::SharedAppState;
use crate::common::{log_transaction_event, LogLevel};
use crate::payment::is_valid_ltc_address;
use crate::storage::PendingDeposit;

#[derive(Debug, Deserialize)]
pub struct RegisterDepositRequest {
    pub txid: String,
    pub address: String,
    pub user_id: i64,
    pub amount_ltc: Decimal,
    #[serde(default)]
    pub confirmations: u32,
}

/// POST /api/deposits
///
/// Registers (or refreshes) a pending deposit, pricing it in USD at the
/// current rate.
pub async fn handle_register_deposit(
    State(state): State<SharedAppState>,
    Json(req): Json<RegisterDepositRequest>,
) -> axum::response::Response {
    if req.txid.trim().is_empty() || req.address.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Invalid request",
            "txid and address are required".to_string(),
        );
    }
    if !is_valid_ltc_address(&req.address) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Invalid request",
            format!("Invalid Litecoin address: {}", req.address),
        );
    }
    if req.amount_ltc <= Decimal::ZERO {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Invalid request",
            format!("amount_ltc must be positive, got {}", req.amount_ltc),
        );
    }

    let amount_usd = state.rates.ltc_to_usd(req.amount_ltc).await;
    let deposit = PendingDeposit::new(
        &req.txid,
        &req.address,
        req.user_id,
        req.amount_ltc,
        amount_usd,
    )
    .with_confirmations(req.confirmations);

    let stored = match state.store.create_deposit(&deposit).await {
        Ok(()) => state.store.get_deposit(&req.txid).await,
        Err(e) => Err(e),
    };

    match stored {
        Ok(Some(record)) => {
            log_transaction_event(
                &req.txid,
                &req.address,
                req.amount_ltc,
                "DEPOSIT_REGISTERED",
                &format!(
                    "Deposit registered for user {} with {} confirmations",
                    req.user_id, req.confirmations
                ),
                LogLevel::Info,
            );
            (StatusCode::OK, Json(record)).into_response()
        }
        Ok(None) => {
            error!(txid = %req.txid, "Deposit missing right after registration");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Storage error",
                format!("Deposit {} was not persisted", req.txid),
            )
        }
        Err(e) => {
            log_transaction_event(
                &req.txid,
                &req.address,
                req.amount_ltc,
                "DEPOSIT_ERROR",
                &format!("Error registering deposit: {}", e),
                LogLevel::Error,
            );
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Storage error", e.to_string())
        }
    }
}

/// GET /api/deposits/:txid
pub async fn handle_get_deposit(
    State(state): State<SharedAppState>,
    Path(txid): Path<String>,
) -> axum::response::Response {
    match state.store.get_deposit(&txid).await {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "Not found",
            format!("Deposit {} not found", txid),
        ),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "Storage error", e.to_string()),
    }
}

/// GET /api/deposits/pending
pub async fn handle_pending_deposits(State(state): State<SharedAppState>) -> impl IntoResponse {
    match state.store.list_pending_deposits().await {
        Ok(deposits) => Json(serde_json::json!({
            "count": deposits.len(),
            "deposits": deposits
        }))
        .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "Storage error", e.to_string()),
    }
}
