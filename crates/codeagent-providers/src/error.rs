//! Transport-level errors for the Messages API client.

use thiserror::Error;

/// Why a model call produced no usable reply.
///
/// None of these are retried; the caller aborts the current exchange.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never completed (DNS, connect, TLS, reset).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The body was not a valid Messages API response.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}
