//! Aggregation API backends
//!
//! [`MessageApi`] is the contract the aggregate operations are written
//! against. [`HttpApi`] talks to a remote node; `MemoryApi` (see
//! `memory.rs`) keeps everything in process.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use super::message::{BaseMessage, ItemType};
use crate::accounts::AccountError;
use crate::http::{HttpClient, HttpRequest, HttpResponse};

/// Public aggregation API node
pub const DEFAULT_API_SERVER: &str = "https://api2.aleph.im";

/// Aggregation API errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("Unexpected status {status} from {url}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Message rejected: {0}")]
    Rejected(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Account(#[from] AccountError),
}

/// Operations a message store must provide
#[async_trait]
pub trait MessageApi: Send + Sync {
    /// Server identifier, for logging
    fn server(&self) -> &str;

    /// Store a JSON document on a storage engine, returning its hash
    async fn push_to_storage(&self, engine: ItemType, content: &Value) -> Result<String, ApiError>;

    /// Submit a signed message and wait for it to be processed
    async fn broadcast(&self, message: &BaseMessage) -> Result<(), ApiError>;

    /// Fetch the aggregate of `address`, restricted to `keys` when non-empty
    async fn fetch_aggregate(&self, address: &str, keys: &[String]) -> Result<Value, ApiError>;
}

#[derive(Debug, Deserialize)]
struct StorageResponse {
    hash: String,
}

#[derive(Debug, Deserialize)]
struct BroadcastResponse {
    #[serde(default)]
    message_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AggregateResponse {
    data: Value,
}

/// Remote aggregation API over HTTP
#[derive(Clone)]
pub struct HttpApi {
    client: HttpClient,
    server: String,
}

impl HttpApi {
    pub fn new(server: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let server = server.into();
        let client = HttpClient::with_timeout(timeout_secs)?.base_url(server.clone());
        Ok(Self { client, server })
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.url.clone();
        self.client
            .send(request)
            .await
            .map_err(|e| ApiError::Request {
                url: format!("{}{}", self.server.trim_end_matches('/'), url),
                reason: format!("{e:#}"),
            })
    }
}

fn expect_success(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status {
            url: response.url,
            status: response.status_code,
            body: response.body,
        })
    }
}

#[async_trait]
impl MessageApi for HttpApi {
    fn server(&self) -> &str {
        &self.server
    }

    async fn push_to_storage(&self, engine: ItemType, content: &Value) -> Result<String, ApiError> {
        if !engine.is_storage_engine() {
            return Err(ApiError::Rejected(format!("{engine} is not a storage engine")));
        }

        let request = HttpRequest::post(format!("/api/v0/{engine}/add_json"))
            .json(content)
            .map_err(|e| ApiError::Rejected(e.to_string()))?;
        let response = expect_success(self.send(request).await?)?;
        let stored: StorageResponse = response.json()?;

        debug!("Stored content on {} as {}", engine, stored.hash);
        Ok(stored.hash)
    }

    async fn broadcast(&self, message: &BaseMessage) -> Result<(), ApiError> {
        let request = HttpRequest::post("/api/v0/messages")
            .json(&json!({ "sync": true, "message": message }))
            .map_err(|e| ApiError::Rejected(e.to_string()))?;
        let response = self.send(request).await?;

        if response.status_code == 422 {
            return Err(ApiError::Rejected(response.body));
        }
        let response = expect_success(response)?;

        match response.json::<BroadcastResponse>() {
            Ok(BroadcastResponse {
                message_status: Some(status),
            }) if status == "rejected" => Err(ApiError::Rejected(response.body)),
            Ok(BroadcastResponse {
                message_status: Some(status),
            }) => {
                debug!("Message {} is {}", message.item_hash, status);
                Ok(())
            }
            _ => {
                warn!("Unrecognized broadcast response: {}", response.body);
                Ok(())
            }
        }
    }

    async fn fetch_aggregate(&self, address: &str, keys: &[String]) -> Result<Value, ApiError> {
        let mut request = HttpRequest::get(format!("/api/v0/aggregates/{address}.json"));
        if !keys.is_empty() {
            request = request.query("keys", keys.join(","));
        }

        let response = self.send(request).await?;
        if response.status_code == 404 {
            return Err(ApiError::NotFound(format!("aggregate for {address}")));
        }
        let response = expect_success(response)?;
        let aggregate: AggregateResponse = response.json()?;
        Ok(aggregate.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_api_creation() {
        let api = HttpApi::new(DEFAULT_API_SERVER, 10).unwrap();
        assert_eq!(api.server(), DEFAULT_API_SERVER);
    }

    #[test]
    fn test_inline_is_not_a_storage_engine() {
        let api = HttpApi::new(DEFAULT_API_SERVER, 10).unwrap();
        let result = tokio_test::block_on(api.push_to_storage(ItemType::Inline, &json!({})));
        assert!(matches!(result, Err(ApiError::Rejected(_))));
    }

    #[test]
    fn test_expect_success() {
        let ok = HttpResponse {
            url: "u".to_string(),
            status_code: 200,
            body: String::new(),
        };
        assert!(expect_success(ok.clone()).is_ok());

        let failed = HttpResponse {
            status_code: 500,
            body: "boom".to_string(),
            ..ok
        };
        match expect_success(failed) {
            Err(ApiError::Status { status, body, .. }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_response_shapes() {
        let stored: StorageResponse =
            serde_json::from_str(r#"{"status":"success","hash":"Qm123"}"#).unwrap();
        assert_eq!(stored.hash, "Qm123");

        let aggregate: AggregateResponse =
            serde_json::from_str(r#"{"address":"5G","data":{"cheer":{"body":"x"}}}"#).unwrap();
        assert_eq!(aggregate.data["cheer"]["body"], "x");
    }
}
