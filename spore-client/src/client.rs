//! JSON-RPC transport shared by the indexer and node clients.

use crate::config::validate_url;
use crate::error::{ClientError, Result};
use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<R> {
    result: Option<R>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// A JSON-RPC 2.0 client for one CKB endpoint.
///
/// # Example
///
/// ```no_run
/// use spore_client::RpcClient;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let rpc = RpcClient::new("https://testnet.ckb.dev/rpc")?
///     .with_timeout(Duration::from_secs(10))?;
/// let tip: String = rpc.call("get_tip_block_number", Vec::<()>::new()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RpcClient {
    /// Endpoint URL.
    url: String,
    /// HTTP client.
    http: HttpClient,
    /// Request id counter, shared between clones.
    next_id: Arc<AtomicU64>,
}

impl RpcClient {
    /// Create a new client for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be created.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        validate_url(&url)?;

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            url,
            http,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Set a custom timeout for all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be rebuilt.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = HttpClient::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// The endpoint this client talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call a JSON-RPC method and deserialize its result.
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        tracing::trace!(method, id, url = %self.url, "JSON-RPC call");
        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(ClientError::Http)?;

        self.handle_response(method, response).await
    }

    /// Handle a response and unwrap the JSON-RPC envelope.
    async fn handle_response<R: DeserializeOwned>(
        &self,
        method: &str,
        response: Response,
    ) -> Result<R> {
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let bytes = response.bytes().await.map_err(ClientError::Http)?;
        let envelope: RpcResponse<R> = serde_json::from_slice(&bytes)?;

        if let Some(error) = envelope.error {
            tracing::debug!(method, code = error.code, "JSON-RPC error");
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        envelope.result.ok_or_else(|| {
            ClientError::InvalidResponse(format!("{} returned neither result nor error", method))
        })
    }
}
