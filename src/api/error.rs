//! Error types for backend API calls.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::storage::StorageError;

/// Failure of a single API action.
///
/// Actions record [`ApiError::detail`] in the store's shared error field and
/// return the error itself, so callers get the full taxonomy while UI code
/// can keep reading one last-error projection.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure: connection refused, DNS, timeout, TLS.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}")]
    Status {
        status: StatusCode,
        /// Decoded error payload: JSON body when parseable, raw text
        /// otherwise, `Null` for an empty body.
        detail: Value,
    },

    /// A success response whose body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// `refresh_session` was called without a stored refresh token.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// Persisting or clearing the session shadow failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// The value an action records in the store: the server's error payload
    /// when one was received, otherwise the action's fallback message.
    pub fn detail(&self, fallback: &str) -> Value {
        match self {
            ApiError::Status { detail, .. } if !detail.is_null() => detail.clone(),
            _ => Value::String(fallback.to_string()),
        }
    }
}
