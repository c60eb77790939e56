use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{GamesGateway, GatewayQuery};

/// Talks to a running gateway's `/api/games` route over HTTP.
#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    endpoint: Url,
}

impl GatewayClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8080/`.
    pub fn new(base_url: &str) -> Result<Self> {
        let endpoint = Url::parse(base_url)
            .with_context(|| format!("Invalid gateway URL: {}", base_url))?
            .join("api/games")
            .context("Failed to build /api/games URL")?;
        let http = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(GatewayClient { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn url_for(&self, query: &GatewayQuery) -> Result<Url> {
        Url::parse_with_params(self.endpoint.as_str(), query.to_params())
            .context("Failed to encode gateway query")
    }
}

#[async_trait]
impl GamesGateway for GatewayClient {
    async fn query(&self, query: &GatewayQuery) -> Result<Value> {
        let url = self.url_for(query)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .context("Gateway request failed")?;

        // Gateway error responses are JSON without a `result` member; the
        // caller treats that as end-of-data.
        let raw: Value = resp
            .json()
            .await
            .context("Failed to parse gateway response")?;
        Ok(raw)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_route() {
        let c = GatewayClient::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(c.endpoint().as_str(), "http://127.0.0.1:8080/api/games");
    }

    #[test]
    fn test_query_string_encodes_json_arrays() {
        let c = GatewayClient::new("http://localhost:8080/").unwrap();
        let url = c
            .url_for(&GatewayQuery::scores(vec![1, 2], 50, 0))
            .unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("gameIds".to_string(), "[1,2]".to_string()),
                ("count".to_string(), "50".to_string()),
                ("offset".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(GatewayClient::new("not a url").is_err());
    }
}
