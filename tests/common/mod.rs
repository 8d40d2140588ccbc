//! Fake Esplora server for integration tests
//!
//! Serves canned responses keyed by path and query, counts requests, and can
//! delay individual routes.

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeExplorer {
    routes: Arc<Mutex<HashMap<String, Route>>>,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    total: Arc<AtomicUsize>,
}

impl FakeExplorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with 200 at `/api{path}`
    pub fn json(&self, path: &str, body: serde_json::Value) -> &Self {
        self.route(path, 200, &body.to_string(), None)
    }

    pub fn route(&self, path: &str, status: u16, body: &str, delay: Option<Duration>) -> &Self {
        self.routes.lock().unwrap().insert(
            format!("/api{}", path),
            Route {
                status,
                body: body.to_string(),
                delay,
            },
        );
        self
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits
            .lock()
            .unwrap()
            .get(&format!("/api{}", path))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Bind an ephemeral port and serve in the background; returns the API base URL
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        let app = Router::new().fallback(serve).with_state(self.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}/api", addr)
    }
}

async fn serve(State(fake): State<FakeExplorer>, uri: Uri) -> (StatusCode, String) {
    let key = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    fake.total.fetch_add(1, Ordering::SeqCst);
    *fake.hits.lock().unwrap().entry(key.clone()).or_default() += 1;

    let route = fake.routes.lock().unwrap().get(&key).cloned();
    match route {
        Some(route) => {
            if let Some(delay) = route.delay {
                tokio::time::sleep(delay).await;
            }
            (
                StatusCode::from_u16(route.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                route.body,
            )
        }
        None => (StatusCode::NOT_FOUND, "Not Found".to_string()),
    }
}
