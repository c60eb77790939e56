use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

pub const GAMES_SEARCH: &str = "games.search";
pub const SCORES_SEARCH: &str = "games.scores.search";

/// Outbound JSON-RPC 2.0 request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: serde_json::Value,
    pub id: u32,
}

impl RpcRequest {
    pub fn new(method: &'static str, params: serde_json::Value) -> Self {
        RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        }
    }
}

/// Anything that can deliver an RPC request upstream and hand back the raw
/// JSON response.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, request: &RpcRequest) -> Result<serde_json::Value>;
}

/// JSON-RPC over HTTPS POST to the ScoreStream API.
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
    endpoint: String,
}

impl HttpTransport {
    /// `timeout` of `None` lets a request wait as long as the upstream does.
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder.build().context("Failed to build HTTP client")?;
        Ok(HttpTransport {
            http,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, request: &RpcRequest) -> Result<serde_json::Value> {
        debug!("POST {} method={}", self.endpoint, request.method);

        let resp = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .with_context(|| format!("ScoreStream {} request failed", request.method))?;

        // Error statuses still carry a JSON-RPC body worth forwarding, so the
        // status is not checked here.
        let raw: serde_json::Value = resp
            .json()
            .await
            .context("Failed to parse ScoreStream response")?;
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_envelope_shape() {
        let req = RpcRequest::new(GAMES_SEARCH, json!({ "count": 30 }));
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(
            body,
            json!({
                "jsonrpc": "2.0",
                "method": "games.search",
                "params": { "count": 30 },
                "id": 1
            })
        );
    }
}
