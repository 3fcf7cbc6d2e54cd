//! HTTP client with bearer auth header injection.
//!
//! Wraps `reqwest` with the backend base URL and the current access token.
//! Every request attaches `Authorization: Bearer <token>` when a token is
//! held; requests issued before login (login itself, refresh, password
//! reset) simply go out without the header.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::error::ApiError;

/// HTTP client wrapper for AquaGreen API communication.
pub struct ApiClient {
    client: Client,
    base_url: String,
    access_token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a new API client with the given base URL.
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: Arc::new(RwLock::new(None)),
        }
    }

    /// Store the access token attached to subsequent requests.
    pub async fn set_access_token(&self, token: String) {
        let mut guard = self.access_token.write().await;
        *guard = Some(token);
    }

    /// Drop the access token (used on logout and session teardown).
    pub async fn clear_access_token(&self) {
        let mut guard = self.access_token.write().await;
        *guard = None;
    }

    /// Send a GET request to a relative API path.
    pub async fn get(&self, path: &str) -> Result<Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.access_token.read().await;

        let mut builder = self.client.get(&url);
        if let Some(ref t) = *token {
            builder = builder.bearer_auth(t);
        }
        builder.send().await
    }

    /// Send a POST request with a JSON body to a relative API path.
    pub async fn post<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.access_token.read().await;

        let mut builder = self.client.post(&url).json(body);
        if let Some(ref t) = *token {
            builder = builder.bearer_auth(t);
        }
        builder.send().await
    }

    /// Send a multipart POST request (file uploads).
    pub async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.access_token.read().await;

        let mut builder = self.client.post(&url).multipart(form);
        if let Some(ref t) = *token {
            builder = builder.bearer_auth(t);
        }
        builder.send().await
    }
}

/// Decode a response into `T`.
///
/// Non-success statuses become [`ApiError::Status`] carrying the decoded
/// error payload; success bodies that fail to parse become
/// [`ApiError::Decode`].
pub async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            status,
            detail: error_detail(resp).await,
        });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Extract the error payload from a failed response: JSON when parseable,
/// the raw text otherwise, `Null` for an empty body.
async fn error_detail(resp: Response) -> Value {
    let text = resp.text().await.unwrap_or_default();
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}
