//! Proxy gateway in front of the ScoreStream JSON-RPC API.
//!
//! A gateway query carries the `/api/games` query parameters. It is turned
//! into exactly one upstream call. When `gameIds` is present the call is a
//! `games.scores.search` for those ids, otherwise a `games.search` scoped to
//! the configured organization. The server-held API key is attached here and
//! never leaves the process. The upstream JSON is handed back untouched,
//! error member included.

pub mod client;

pub use client::GatewayClient;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::scorestream::rpc::{RpcRequest, RpcTransport, GAMES_SEARCH, SCORES_SEARCH};

pub const DEFAULT_COUNT: u32 = 30;
pub const DEFAULT_STATE: &str = "OH";
pub const DEFAULT_SPORT: &str = "basketball";
pub const DEFAULT_SQUAD_ID: i64 = 1010;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("API key not configured")]
    MissingApiKey,
    #[error("invalid {name}: {reason}")]
    InvalidParam { name: &'static str, reason: String },
    #[error("upstream request failed: {0:#}")]
    Upstream(anyhow::Error),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::InvalidParam { .. } => StatusCode::BAD_REQUEST,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Parsed `/api/games` query. `None` means the parameter was absent (or
/// empty) and the upstream default applies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatewayQuery {
    pub game_ids: Option<Vec<i64>>,
    pub state: Option<String>,
    pub after_date_time: Option<String>,
    pub before_date_time: Option<String>,
    pub sport_names: Option<Vec<String>>,
    pub squad_ids: Option<Vec<i64>>,
    pub count: Option<u32>,
    pub offset: Option<u32>,
}

impl GatewayQuery {
    /// Scores search for the given games.
    pub fn scores(game_ids: Vec<i64>, count: u32, offset: u32) -> Self {
        GatewayQuery {
            game_ids: Some(game_ids),
            count: Some(count),
            offset: Some(offset),
            ..Default::default()
        }
    }

    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, GatewayError> {
        Ok(GatewayQuery {
            game_ids: json_param(params, "gameIds")?,
            state: text_param(params, "state"),
            after_date_time: text_param(params, "afterDateTime"),
            before_date_time: text_param(params, "beforeDateTime"),
            sport_names: json_param(params, "sportNames")?,
            squad_ids: json_param(params, "squadIds")?,
            count: int_param(params, "count")?,
            offset: int_param(params, "offset")?,
        })
    }

    /// Inverse of [`GatewayQuery::from_params`], for calling a remote gateway.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(ids) = &self.game_ids {
            out.push(("gameIds", json!(ids).to_string()));
        }
        if let Some(s) = &self.state {
            out.push(("state", s.clone()));
        }
        if let Some(s) = &self.after_date_time {
            out.push(("afterDateTime", s.clone()));
        }
        if let Some(s) = &self.before_date_time {
            out.push(("beforeDateTime", s.clone()));
        }
        if let Some(v) = &self.sport_names {
            out.push(("sportNames", json!(v).to_string()));
        }
        if let Some(v) = &self.squad_ids {
            out.push(("squadIds", json!(v).to_string()));
        }
        if let Some(c) = self.count {
            out.push(("count", c.to_string()));
        }
        if let Some(o) = self.offset {
            out.push(("offset", o.to_string()));
        }
        out
    }

    /// Build the upstream call, filling in defaults for anything absent.
    pub fn to_request(&self, api_key: &str, organization_id: i64) -> RpcRequest {
        let count = self.count.unwrap_or(DEFAULT_COUNT);
        let offset = self.offset.unwrap_or(0);

        if let Some(game_ids) = &self.game_ids {
            return RpcRequest::new(
                SCORES_SEARCH,
                json!({
                    "apiKey": api_key,
                    "gameIds": game_ids,
                    "includeGameScoreSupplements": true,
                    "includeUserSupplements": true,
                    "count": count,
                    "offset": offset,
                }),
            );
        }

        RpcRequest::new(
            GAMES_SEARCH,
            json!({
                "apiKey": api_key,
                "organizationIds": [organization_id],
                "state": self.state.as_deref().unwrap_or(DEFAULT_STATE),
                "afterDateTime": self.after_date_time.as_deref().unwrap_or(""),
                "beforeDateTime": self.before_date_time.as_deref().unwrap_or(""),
                "sportNames": self
                    .sport_names
                    .clone()
                    .unwrap_or_else(|| vec![DEFAULT_SPORT.to_string()]),
                "squadIds": self.squad_ids.clone().unwrap_or_else(|| vec![DEFAULT_SQUAD_ID]),
                "count": count,
                "offset": offset,
                "orderBy": "DESC",
            }),
        )
    }
}

fn text_param(params: &HashMap<String, String>, name: &str) -> Option<String> {
    params.get(name).filter(|v| !v.is_empty()).cloned()
}

fn json_param<T: DeserializeOwned>(
    params: &HashMap<String, String>,
    name: &'static str,
) -> Result<Option<T>, GatewayError> {
    match params.get(name).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| GatewayError::InvalidParam {
                name,
                reason: e.to_string(),
            }),
    }
}

fn int_param(
    params: &HashMap<String, String>,
    name: &'static str,
) -> Result<Option<u32>, GatewayError> {
    match params.get(name).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|e| GatewayError::InvalidParam {
                name,
                reason: e.to_string(),
            }),
    }
}

/// The two-method upstream surface the aggregator and detail view consume.
#[async_trait]
pub trait GamesGateway: Send + Sync {
    /// Run one gateway query and return the upstream JSON-RPC envelope.
    async fn query(&self, query: &GatewayQuery) -> Result<Value>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// In-process gateway holding the API key and the upstream transport.
#[derive(Clone)]
pub struct Gateway {
    api_key: Option<String>,
    organization_id: i64,
    transport: Arc<dyn RpcTransport>,
}

impl Gateway {
    pub fn new(
        api_key: Option<String>,
        organization_id: i64,
        transport: Arc<dyn RpcTransport>,
    ) -> Self {
        Gateway {
            api_key,
            organization_id,
            transport,
        }
    }

    /// Single best-effort forward: no retry, no caching.
    pub async fn forward(&self, query: &GatewayQuery) -> Result<Value, GatewayError> {
        let Some(api_key) = self.api_key.as_deref().filter(|k| !k.is_empty()) else {
            error!("SCORESTREAM_API_KEY is not set; refusing to call upstream");
            return Err(GatewayError::MissingApiKey);
        };

        let request = query.to_request(api_key, self.organization_id);
        debug!(
            "Forwarding {} (count={:?}, offset={:?})",
            request.method, query.count, query.offset
        );

        let raw = self.transport.call(&request).await.map_err(|e| {
            warn!("Upstream {} failed: {:#}", request.method, e);
            GatewayError::Upstream(e)
        })?;

        if let Some(err) = raw.get("error") {
            warn!("Upstream {} returned an error: {}", request.method, err);
        }
        Ok(raw)
    }
}

#[async_trait]
impl GamesGateway for Gateway {
    /// A missing key yields the same `{"error": ...}` body the HTTP route
    /// sends, which carries no `result` and so ends a search as end-of-data.
    async fn query(&self, query: &GatewayQuery) -> Result<Value> {
        match self.forward(query).await {
            Err(GatewayError::MissingApiKey) => {
                Ok(json!({ "error": GatewayError::MissingApiKey.to_string() }))
            }
            other => Ok(other?),
        }
    }

    fn name(&self) -> &str {
        "in-process"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Transport that records every request and replies with a fixed body.
    pub(crate) struct RecordingTransport {
        pub calls: Mutex<Vec<RpcRequest>>,
        pub reply: Value,
    }

    impl RecordingTransport {
        pub fn new(reply: Value) -> Arc<Self> {
            Arc::new(RecordingTransport {
                calls: Mutex::new(Vec::new()),
                reply,
            })
        }
    }

    #[async_trait]
    impl RpcTransport for RecordingTransport {
        async fn call(&self, request: &RpcRequest) -> Result<Value> {
            self.calls.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl RpcTransport for FailingTransport {
        async fn call(&self, _request: &RpcRequest) -> Result<Value> {
            anyhow::bail!("connection refused")
        }
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_game_ids_route_to_scores_search() {
        let transport = RecordingTransport::new(json!({ "jsonrpc": "2.0", "result": {}, "id": 1 }));
        let gw = Gateway::new(Some("secret".into()), 1000, transport.clone());

        let q = GatewayQuery::from_params(&params(&[("gameIds", "[1,2]")])).unwrap();
        gw.forward(&q).await.unwrap();

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "games.scores.search");
        assert_eq!(calls[0].params["gameIds"], json!([1, 2]));
        assert_eq!(calls[0].params["apiKey"], "secret");
        assert_eq!(calls[0].params["includeGameScoreSupplements"], true);
        assert_eq!(calls[0].params["includeUserSupplements"], true);
        assert_eq!(calls[0].params["count"], 30);
        assert_eq!(calls[0].params["offset"], 0);
    }

    #[tokio::test]
    async fn test_games_search_defaults() {
        let transport = RecordingTransport::new(json!({ "jsonrpc": "2.0", "result": {}, "id": 1 }));
        let gw = Gateway::new(Some("secret".into()), 1000, transport.clone());

        gw.forward(&GatewayQuery::default()).await.unwrap();

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let p = &calls[0].params;
        assert_eq!(calls[0].method, "games.search");
        assert_eq!(p["organizationIds"], json!([1000]));
        assert_eq!(p["state"], "OH");
        assert_eq!(p["afterDateTime"], "");
        assert_eq!(p["beforeDateTime"], "");
        assert_eq!(p["sportNames"], json!(["basketball"]));
        assert_eq!(p["squadIds"], json!([1010]));
        assert_eq!(p["count"], 30);
        assert_eq!(p["offset"], 0);
        assert_eq!(p["orderBy"], "DESC");
    }

    #[tokio::test]
    async fn test_missing_api_key_makes_no_upstream_call() {
        let transport = RecordingTransport::new(json!({}));
        let gw = Gateway::new(None, 1000, transport.clone());

        let err = gw.forward(&GatewayQuery::default()).await.unwrap_err();
        assert!(matches!(err, GatewayError::MissingApiKey));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "API key not configured");
        assert!(transport.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_api_key_query_returns_error_body() {
        let transport = RecordingTransport::new(json!({}));
        let gw = Gateway::new(None, 1000, transport.clone());

        let body = gw.query(&GatewayQuery::default()).await.unwrap();
        assert_eq!(body, json!({ "error": "API key not configured" }));
        assert!(body.get("result").is_none());
        assert!(transport.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_error_body_forwarded_verbatim() {
        let body = json!({
            "jsonrpc": "2.0",
            "error": { "code": -32602, "message": "bad params" },
            "id": 1
        });
        let gw = Gateway::new(Some("k".into()), 1000, RecordingTransport::new(body.clone()));
        let out = gw.forward(&GatewayQuery::default()).await.unwrap();
        assert_eq!(out, body);
    }

    #[tokio::test]
    async fn test_transport_failure_is_bad_gateway() {
        let gw = Gateway::new(Some("k".into()), 1000, Arc::new(FailingTransport));
        let err = gw.forward(&GatewayQuery::default()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_empty_params_are_absent() {
        let q = GatewayQuery::from_params(&params(&[("gameIds", ""), ("state", "")])).unwrap();
        assert_eq!(q, GatewayQuery::default());
    }

    #[test]
    fn test_malformed_params_rejected() {
        let err = GatewayQuery::from_params(&params(&[("squadIds", "[10")])).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let err = GatewayQuery::from_params(&params(&[("count", "thirty")])).unwrap_err();
        assert!(err.to_string().starts_with("invalid count"));
    }

    #[test]
    fn test_params_survive_query_string_form() {
        let q = GatewayQuery {
            state: Some("TX".into()),
            after_date_time: Some("2026-01-05 00:00:00".into()),
            sport_names: Some(vec!["soccer".into()]),
            squad_ids: Some(vec![1040]),
            count: Some(30),
            offset: Some(60),
            ..Default::default()
        };
        let map: HashMap<String, String> = q
            .to_params()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(GatewayQuery::from_params(&map).unwrap(), q);
    }
}
