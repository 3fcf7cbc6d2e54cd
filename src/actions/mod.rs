//! Asynchronous actions against the AquaGreen backend.
//!
//! Every action follows the same protocol: mark the request in-flight,
//! clear the last error, issue exactly one HTTP request, and drop the
//! in-flight mark when the request settles. A failing action records the
//! server's error payload (or the action's fallback message for transport
//! failures) in the store and returns the error to the caller.


use std::future::Future;

use reqwest::multipart;

use crate::api::client::decode;
use crate::api::error::ApiError;
use crate::api::types::{
    AuthResponse, FileRecord, LoginRequest, PasswordResetConfirmRequest, PasswordResetRequest,
    ProcessResponse, ProcessedRecord, RefreshRequest, RefreshResponse, RegisterRequest,
    StatusMessage, UploadResponse, User,
};
use crate::state::AppState;

/// Run one request under the shared loading/error protocol.
async fn run<T, F>(state: &AppState, fallback: &str, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    state.begin_request().await;
    let result = fut.await;
    let error = result.as_ref().err().map(|e| e.detail(fallback));
    state.end_request(error).await;
    result
}

/// Create an account. A successful registration immediately starts a
/// session from the returned token pair.
pub async fn register(state: &AppState, data: RegisterRequest) -> Result<AuthResponse, ApiError> {
    run(state, "Registration failed", async {
        let resp = state.api.post("/auth/register/", &data).await?;
        let auth: AuthResponse = decode(resp).await?;
        state
            .set_session(
                auth.access.clone(),
                auth.refresh.clone(),
                Some(auth.user.clone()),
            )
            .await?;
        log::info!("Registered and logged in as {}", auth.user.username);
        Ok(auth)
    })
    .await
}

/// Exchange credentials for a session.
pub async fn login(state: &AppState, credentials: LoginRequest) -> Result<AuthResponse, ApiError> {
    run(state, "Login failed", async {
        let resp = state.api.post("/auth/login/", &credentials).await?;
        let auth: AuthResponse = decode(resp).await?;
        state
            .set_session(
                auth.access.clone(),
                auth.refresh.clone(),
                Some(auth.user.clone()),
            )
            .await?;
        log::info!("Logged in as {}", auth.user.username);
        Ok(auth)
    })
    .await
}

/// Mint a new access token from the held refresh token.
///
/// Fails immediately, without a network call, when no refresh token is
/// held. A rejected refresh invalidates the whole session: all session
/// fields are cleared before the error is returned. The refresh token and
/// user object are carried over unchanged on success.
pub async fn refresh_session(state: &AppState) -> Result<RefreshResponse, ApiError> {
    let Some(refresh) = state.refresh_token().await else {
        return Err(ApiError::NoRefreshToken);
    };

    state.begin_request().await;
    let result = async {
        let body = RefreshRequest {
            refresh: refresh.clone(),
        };
        let resp = state.api.post("/auth/token/refresh/", &body).await?;
        let refreshed: RefreshResponse = decode(resp).await?;

        let user = state.current_user().await;
        state
            .set_session(refreshed.access.clone(), refresh.clone(), user)
            .await?;
        log::info!("Access token refreshed");
        Ok(refreshed)
    }
    .await;

    if let Err(ref e) = result {
        log::warn!("Token refresh rejected, clearing session: {}", e);
        state.clear_session().await;
    }
    state.end_request(None).await;
    result
}

/// Clear the session. Issues no network request and never fails.
pub async fn logout(state: &AppState) {
    state.clear_session().await;
    log::info!("Logged out");
}

/// Fetch the authenticated user's profile and refresh the stored user.
pub async fn fetch_profile(state: &AppState) -> Result<User, ApiError> {
    run(state, "Failed to fetch profile", async {
        let resp = state.api.get("/auth/profile/").await?;
        let user: User = decode(resp).await?;
        state.set_user(user.clone()).await?;
        Ok(user)
    })
    .await
}

/// Fetch the uploaded-file list, replacing the cached one.
pub async fn fetch_files(state: &AppState) -> Result<Vec<FileRecord>, ApiError> {
    run(state, "Failed to fetch files", async {
        let resp = state.api.get("/excel-files/").await?;
        let files: Vec<FileRecord> = decode(resp).await?;
        state.set_files(files.clone()).await;
        Ok(files)
    })
    .await
}

/// Fetch one file's details, replacing the currently viewed file.
pub async fn fetch_file(state: &AppState, id: u64) -> Result<FileRecord, ApiError> {
    run(state, "Failed to fetch file details", async {
        let resp = state.api.get(&format!("/excel-files/{}/", id)).await?;
        let file: FileRecord = decode(resp).await?;
        state.set_current_file(file.clone()).await;
        Ok(file)
    })
    .await
}

/// Upload a spreadsheet as multipart form data (`title`, `file`).
///
/// The cached file list is left untouched; callers refetch it when they
/// want the new entry to appear.
pub async fn upload_file(
    state: &AppState,
    title: &str,
    file_name: &str,
    contents: Vec<u8>,
) -> Result<UploadResponse, ApiError> {
    run(state, "Failed to upload file", async {
        let part = multipart::Part::bytes(contents).file_name(file_name.to_string());
        let form = multipart::Form::new()
            .text("title", title.to_string())
            .part("file", part);

        let resp = state.api.post_multipart("/excel-files/", form).await?;
        let uploaded: UploadResponse = decode(resp).await?;
        log::info!("Uploaded {} as file {}", uploaded.file.title, uploaded.file.id);
        Ok(uploaded)
    })
    .await
}

/// Ask the backend to extract rows from an uploaded file. No state mutation.
pub async fn process_file(state: &AppState, id: u64) -> Result<ProcessResponse, ApiError> {
    run(state, "Failed to process file", async {
        let resp = state
            .api
            .post(&format!("/excel-files/{}/process/", id), &serde_json::json!({}))
            .await?;
        decode(resp).await
    })
    .await
}

/// Fetch the processed rows for a file, replacing the cached ones.
pub async fn fetch_processed_data(
    state: &AppState,
    file_id: u64,
) -> Result<Vec<ProcessedRecord>, ApiError> {
    run(state, "Failed to fetch processed data", async {
        let resp = state
            .api
            .get(&format!("/processed-data/by_file/?file_id={}", file_id))
            .await?;
        let data: Vec<ProcessedRecord> = decode(resp).await?;
        state.set_processed_data(data.clone()).await;
        Ok(data)
    })
    .await
}

/// Ask the backend to e-mail a password reset link. No state mutation.
pub async fn request_password_reset(
    state: &AppState,
    email: &str,
) -> Result<StatusMessage, ApiError> {
    run(state, "Failed to request password reset", async {
        let body = PasswordResetRequest {
            email: email.to_string(),
        };
        let resp = state.api.post("/auth/password-reset/", &body).await?;
        decode(resp).await
    })
    .await
}

/// Complete a password reset with the uid and token from the e-mailed link.
pub async fn confirm_password_reset(
    state: &AppState,
    uid: &str,
    token: &str,
    new_password: &str,
) -> Result<StatusMessage, ApiError> {
    run(state, "Failed to reset password", async {
        let body = PasswordResetConfirmRequest {
            uid: uid.to_string(),
            token: token.to_string(),
            new_password: new_password.to_string(),
        };
        let resp = state.api.post("/auth/password-reset/confirm/", &body).await?;
        decode(resp).await
    })
    .await
}
