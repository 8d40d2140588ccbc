//! API Server Module
//!
//! Provides the Axum application builder and server startup logic.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use super::routes::{deposits, health, payments};
use crate::deposit_tracker::TrackerStats;
use crate::payment::PaymentMatcher;
use crate::rates::RateOracle;
use crate::storage::DepositStore;

/// Combined application state for all API endpoints
pub struct AppState {
    pub matcher: PaymentMatcher,
    pub rates: Arc<RateOracle>,
    pub store: Arc<dyn DepositStore>,
    /// Live statistics of the reconciliation loop
    pub stats: Arc<RwLock<TrackerStats>>,
}

/// Shared application state type
pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub fn new(
        matcher: PaymentMatcher,
        rates: Arc<RateOracle>,
        store: Arc<dyn DepositStore>,
        stats: Arc<RwLock<TrackerStats>>,
    ) -> SharedAppState {
        Arc::new(Self {
            matcher,
            rates,
            store,
            stats,
        })
    }
}

/// Build the application router
pub fn create_router(state: SharedAppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health::handle_health))
        .route("/api/tracker/stats", get(health::handle_tracker_stats))
        .route("/api/address/:address", get(payments::handle_address))
        .route("/api/address/:address/txs", get(payments::handle_address_txs))
        .route("/api/payments/check", post(payments::handle_check_payment))
        .route("/api/rate", get(payments::handle_rate))
        .route("/api/deposits", post(deposits::handle_register_deposit))
        .route("/api/deposits/pending", get(deposits::handle_pending_deposits))
        .route("/api/deposits/:txid", get(deposits::handle_get_deposit))
        .layer(cors)
        .with_state(state)
}

/// Bind `0.0.0.0:port` and serve until the process exits
pub async fn start_server(state: SharedAppState, port: u16) -> Result<(), std::io::Error> {
    let app = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    info!(%addr, "LTC payments API listening");
    info!("  GET  /api/health                 - Health check");
    info!("  GET  /api/address/:address       - Address validity and balance");
    info!("  GET  /api/address/:address/txs   - Address transaction history");
    info!("  POST /api/payments/check         - Check for an expected payment");
    info!("  GET  /api/rate                   - LTC/USD rate");
    info!("  POST /api/deposits               - Register a deposit");
    info!("  GET  /api/deposits/pending       - List pending deposits");
    info!("  GET  /api/deposits/:txid         - Get a deposit");
    info!("  GET  /api/tracker/stats          - Reconciliation statistics");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
