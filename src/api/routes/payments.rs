//! Address, payment and rate endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error_response;
use crate::api::server::SharedAppState;
use crate::payment::{PaymentError, DEFAULT_TX_HISTORY_LIMIT};

#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub address: String,
    pub valid: bool,
    pub balance_ltc: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct TxHistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CheckPaymentRequest {
    pub address: String,
    /// Expected amount in LTC
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub ltc_usd: Decimal,
    /// Whether the rate came from a quote younger than the TTL
    pub fresh: bool,
}

/// GET /api/address/:address
pub async fn handle_address(
    State(state): State<SharedAppState>,
    Path(address): Path<String>,
) -> impl IntoResponse {
    let valid = state.matcher.validate_address(&address).await;
    let balance_ltc = if valid {
        state.matcher.get_balance(&address).await
    } else {
        Decimal::ZERO
    };

    Json(AddressResponse {
        address,
        valid,
        balance_ltc,
    })
}

/// GET /api/address/:address/txs?limit=N
pub async fn handle_address_txs(
    State(state): State<SharedAppState>,
    Path(address): Path<String>,
    Query(query): Query<TxHistoryQuery>,
) -> axum::response::Response {
    let limit = query.limit.unwrap_or(DEFAULT_TX_HISTORY_LIMIT);

    match state.matcher.get_address_transactions(&address, limit).await {
        Some(txs) => Json(txs).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            "Not found",
            format!("No transactions available for {}", address),
        ),
    }
}

/// POST /api/payments/check
pub async fn handle_check_payment(
    State(state): State<SharedAppState>,
    Json(req): Json<CheckPaymentRequest>,
) -> axum::response::Response {
    match state.matcher.try_check_payment(&req.address, req.amount).await {
        Ok(result) => Json(result).into_response(),
        Err(e @ (PaymentError::InvalidAddress(_) | PaymentError::InvalidAmount(_))) => {
            error_response(StatusCode::BAD_REQUEST, "Invalid request", e.to_string())
        }
    }
}

/// GET /api/rate
pub async fn handle_rate(State(state): State<SharedAppState>) -> impl IntoResponse {
    let ltc_usd = state.rates.get_ltc_usd_rate().await;
    let (_, fresh) = state.rates.cached_rate().await;
    Json(RateResponse { ltc_usd, fresh })
}
