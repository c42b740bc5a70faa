//! Error types for the Spore client.

use thiserror::Error;

/// Errors that can occur when querying the chain or decoding cells.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint returned a non-success HTTP status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the endpoint.
        message: String,
    },

    /// JSON-RPC call returned an error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message from the node or indexer.
        message: String,
    },

    /// Failed to deserialize response.
    #[error("Failed to deserialize response: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid response format.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// Cell data could not be decoded.
    #[error("Failed to decode {entity}: {cause}")]
    Decode {
        /// Which structure was being decoded.
        entity: &'static str,
        /// What was wrong with it.
        cause: String,
    },

    /// A caller-supplied argument was malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration could not be loaded.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub(crate) fn decode(entity: &'static str, cause: impl Into<String>) -> Self {
        Self::Decode {
            entity,
            cause: cause.into(),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
