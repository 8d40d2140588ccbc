//! API Layer Module
//!
//! HTTP server and route handlers.

pub mod routes;
pub mod server;

pub use server::{create_router, start_server, AppState, SharedAppState};
