//! HTTP transport for the explorer and price APIs.
//!
//! Status-code interpretation and JSON decoding live in the callers; the
//! transport only moves bytes and classifies connection-level failures.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::ExplorerError;

/// Raw HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 response with a JSON body
    pub fn ok_json(value: &serde_json::Value) -> Self {
        Self::new(200, value.to_string())
    }
}

/// GET-only transport used by the explorer client and the rate oracle
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, ExplorerError>;
}

/// reqwest-backed transport sharing one connection pool
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, ExplorerError> {
        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| classify(url, e))?;

        Ok(HttpResponse { status, body })
    }
}

fn classify(url: &str, err: reqwest::Error) -> ExplorerError {
    if err.is_timeout() {
        ExplorerError::Timeout(url.to_string())
    } else {
        ExplorerError::Transport(format!("{}: {}", url, err))
    }
}
