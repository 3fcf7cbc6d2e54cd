//! Client state store and API bindings for the AquaGreen Monitoring backend.
//!
//! The crate centers on [`AppState`]: an explicitly constructed state
//! container holding the session (tokens + user), cached file and
//! processed-data projections, and the shared request status. The
//! [`actions`] module drives it against the backend's REST API; the
//! [`storage`] module persists the session across restarts.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use aquagreen_client::api::types::LoginRequest;
//! use aquagreen_client::storage::KeychainStorage;
//! use aquagreen_client::{actions, AppState};
//!
//! # async fn demo() -> Result<(), aquagreen_client::ApiError> {
//! let state = AppState::new("http://localhost:8000/api", Arc::new(KeychainStorage::new()));
//! state.restore().await?;
//!
//! if !state.is_authenticated().await {
//!     actions::login(
//!         &state,
//!         LoginRequest {
//!             username: "ada".into(),
//!             password: "s3cret".into(),
//!         },
//!     )
//!     .await?;
//! }
//!
//! let files = actions::fetch_files(&state).await?;
//! println!("{} files uploaded", files.len());
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod api;
pub mod state;
pub mod storage;

pub use api::error::ApiError;
pub use state::AppState;
