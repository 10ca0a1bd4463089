//! Error types for backend API access.

use reqwest::StatusCode;
use thiserror::Error;

use tillpoint_core::StoreError;

/// Error type for API client operations.
///
/// Ordinary non-2xx statuses are not represented here: the request pipeline
/// hands the response back as-is, and only the typed endpoint wrappers turn
/// an uninterpreted status into [`ApiError::UnexpectedStatus`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// No host has been configured; nothing was sent.
    #[error("host not configured")]
    HostNotConfigured,

    /// No access token is stored; nothing was sent.
    #[error("no access token available")]
    NoAccessToken,

    /// A 401 survived the refresh-and-retry attempt; the user must log in
    /// again.
    #[error("session expired, log in again")]
    ReauthenticationRequired,

    /// The configured base URL does not parse.
    #[error("invalid API base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Network-level failure (timeout, connection refused, DNS). Never
    /// retried by this layer.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response arrived but its body was not the expected JSON.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] reqwest::Error),

    /// A login response lacked one or both token fields.
    #[error("login response missing token fields")]
    MissingTokens,

    /// A status the calling wrapper does not interpret.
    #[error("unexpected response status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },

    /// Credential persistence failed. Fatal to the triggering operation.
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),

    /// A request payload could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
