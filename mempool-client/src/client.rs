//! HTTP implementation of [`MempoolApi`] using reqwest.
//!
//! ## Endpoints
//!
//! | Operation | Path |
//! |-----------|------|
//! | backend info | `/api/v1/backend-info` |
//! | recommended fees | `/api/v1/fees/recommended` |
//! | mempool | `/api/mempool` |
//! | tip height | `/api/blocks/tip/height` (text) |
//! | tip hash | `/api/blocks/tip/hash` (text) |
//! | block | `/api/v1/block/{hash}` |
//! | difficulty adjustment | `/api/v1/difficulty-adjustment` |
//! | hashrate | `/api/v1/mining/hashrate/1m` |
//! | reward stats | `/api/v1/mining/reward-stats/144` |
//! | prices | `/api/v1/prices` |
//!
//! ## Example
//!
//! ```rust,no_run
//! use mempool_client::{BaseUrl, MempoolApi, MempoolClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MempoolClient::builder()
//!         .base_url(BaseUrl::parse("https://mempool.space/")?)
//!         .build()?;
//!
//!     let fees = client.recommended_fees().await?;
//!     println!("fastest: {:?} sat/vB", fees.fastest_fee);
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use mempool_types::{Block, DifficultyAdjustment, Fees, Hashrate, MempoolStats, RewardStats};

use crate::{BaseUrl, ClientError, MempoolApi};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Async client for a mempool.space compatible API.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct MempoolClient {
    client: Client,
    base_url: BaseUrl,
}

impl MempoolClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> MempoolClientBuilder {
        MempoolClientBuilder::default()
    }

    /// Wrap an existing reqwest client (and its pool, TLS and timeout setup).
    pub fn with_http_client(client: Client, base_url: BaseUrl) -> Self {
        Self { client, base_url }
    }

    /// The normalized base URL requests are issued against.
    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    async fn get(&self, path: &str) -> Result<Body, ClientError> {
        let url = self.base_url.join(path);
        debug!(%url, "GET");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Response {
                status: status.as_u16(),
                url,
            });
        }

        let plain_text = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(is_plain_text)
            .unwrap_or(false);

        if plain_text {
            Ok(Body::Text(response.text().await?))
        } else {
            let value = response
                .json::<Value>()
                .await
                .map_err(|e| ClientError::Unexpected(format!("Invalid JSON from {}: {}", url, e)))?;
            Ok(Body::Json(value))
        }
    }

    async fn get_object<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.get(path).await?.into_object(path)
    }
}

#[async_trait]
impl MempoolApi for MempoolClient {
    async fn backend_info(&self) -> Result<Value, ClientError> {
        match self.get("/api/v1/backend-info").await? {
            Body::Json(value) => Ok(value),
            Body::Text(text) => Ok(Value::String(text)),
        }
    }

    async fn recommended_fees(&self) -> Result<Fees, ClientError> {
        self.get_object("/api/v1/fees/recommended").await
    }

    async fn mempool(&self) -> Result<MempoolStats, ClientError> {
        self.get_object("/api/mempool").await
    }

    async fn tip_height(&self) -> Result<u64, ClientError> {
        let path = "/api/blocks/tip/height";
        match self.get(path).await? {
            Body::Text(text) => text.trim().parse().map_err(|_| {
                ClientError::Unexpected(format!("{} returned non-numeric height {:?}", path, text))
            }),
            Body::Json(value) => mempool_types::lenient::value_as_u64(&value).ok_or_else(|| {
                ClientError::Unexpected(format!("{} returned non-numeric height {}", path, value))
            }),
        }
    }

    async fn tip_hash(&self) -> Result<String, ClientError> {
        let hash = self.get("/api/blocks/tip/hash").await?.into_text("/api/blocks/tip/hash")?;
        if hash.is_empty() {
            return Err(ClientError::Unexpected("empty tip hash".to_string()));
        }
        Ok(hash)
    }

    async fn block(&self, hash: &str) -> Result<Block, ClientError> {
        self.get_object(&format!("/api/v1/block/{}", hash)).await
    }

    async fn difficulty_adjustment(&self) -> Result<DifficultyAdjustment, ClientError> {
        self.get_object("/api/v1/difficulty-adjustment").await
    }

    async fn hashrate(&self) -> Result<Hashrate, ClientError> {
        self.get_object("/api/v1/mining/hashrate/1m").await
    }

    async fn reward_stats(&self) -> Result<RewardStats, ClientError> {
        self.get_object("/api/v1/mining/reward-stats/144").await
    }

    async fn prices(&self) -> Result<Map<String, Value>, ClientError> {
        self.get_object("/api/v1/prices").await
    }
}

/// Builder for MempoolClient.
#[derive(Debug, Default)]
pub struct MempoolClientBuilder {
    base_url: Option<BaseUrl>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl MempoolClientBuilder {
    /// Set the API base URL (default: https://mempool.space).
    pub fn base_url(mut self, base_url: BaseUrl) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<MempoolClient, ClientError> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| concat!("mempool-client/", env!("CARGO_PKG_VERSION")).to_string());

        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .user_agent(user_agent)
            .build()
            .map_err(|e| ClientError::Unexpected(format!("Failed to build HTTP client: {}", e)))?;

        Ok(MempoolClient {
            client,
            base_url: self.base_url.unwrap_or_default(),
        })
    }
}

/// A decoded response body.
#[derive(Debug)]
enum Body {
    Text(String),
    Json(Value),
}

impl Body {
    fn into_text(self, path: &str) -> Result<String, ClientError> {
        match self {
            Body::Text(text) => Ok(text.trim().to_string()),
            Body::Json(Value::String(text)) => Ok(text.trim().to_string()),
            Body::Json(other) => Err(ClientError::Unexpected(format!(
                "{} returned JSON where text was expected: {}",
                path, other
            ))),
        }
    }

    fn into_object<T: DeserializeOwned>(self, path: &str) -> Result<T, ClientError> {
        match self {
            Body::Json(value @ Value::Object(_)) => serde_json::from_value(value).map_err(|e| {
                ClientError::Unexpected(format!("{} returned an unexpected shape: {}", path, e))
            }),
            Body::Json(other) => Err(ClientError::Unexpected(format!(
                "{} returned {} where an object was expected",
                path,
                json_kind(&other)
            ))),
            Body::Text(_) => Err(ClientError::Unexpected(format!(
                "{} returned text where JSON was expected",
                path
            ))),
        }
    }
}

// Content types carry optional parameters ("text/plain; charset=utf-8").
fn is_plain_text(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().eq_ignore_ascii_case("text/plain"))
        .unwrap_or(false)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
