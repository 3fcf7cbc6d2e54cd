//! Request and response types for the AquaGreen backend API.
//!
//! The backend is a Django/DRF service and emits snake_case JSON, so the
//! structs serialize field names as-is. Error payloads have no fixed shape
//! (`{"error": ...}`, `{"errors": ...}`, `{"detail": ...}`, serializer field
//! maps) and are carried as raw `serde_json::Value` instead -- see
//! [`crate::api::error::ApiError`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Registration request body sent to POST /auth/register/.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// The backend defaults to e-mail OTP verification; `Some(false)` asks it
    /// to issue tokens immediately instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_email: Option<bool>,
}

/// Login request body sent to POST /auth/login/.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token pair plus user object returned by login and registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access: String,
    pub refresh: String,
    pub user: User,
}

/// Refresh request body sent to POST /auth/token/refresh/.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Response from POST /auth/token/refresh/. Only the access token is minted;
/// the refresh token keeps its original lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// The authenticated account, as serialized by the backend's user endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// An uploaded Excel file summary, as returned by the file endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: u64,
    pub title: String,
    /// Storage path of the uploaded file, relative to the backend's media root.
    #[serde(default)]
    pub file: Option<String>,
    /// Absolute download URL, present when the backend can build one.
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub uploaded_by: Option<User>,
    /// ISO-8601 upload timestamp.
    pub uploaded_at: String,
    #[serde(default)]
    pub processed: bool,
}

/// One extracted spreadsheet row from GET /processed-data/by_file/.
///
/// `data_json` holds the raw row object; the backend imposes no schema on
/// spreadsheet contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub id: u64,
    /// Id of the file this row was extracted from.
    pub excel_file: u64,
    #[serde(default)]
    pub data_json: Value,
}

/// Response from POST /excel-files/ (upload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file: FileRecord,
    #[serde(default)]
    pub message: String,
}

/// Response from POST /excel-files/{id}/process/.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub message: String,
}

/// Password reset request body sent to POST /auth/password-reset/.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Confirmation body sent to POST /auth/password-reset/confirm/, carrying the
/// uid and token from the e-mailed reset link.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetConfirmRequest {
    pub uid: String,
    pub token: String,
    pub new_password: String,
}

/// Status-message body returned by the password reset endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    #[serde(default)]
    pub success: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
