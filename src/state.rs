//! Client state for the AquaGreen backend.
//!
//! Thread-safe state holding the session (tokens + user), the cached file
//! and processed-data projections, and the shared request status. The
//! session is mirrored to persistent storage whenever it is set and erased
//! from it whenever it is cleared; token strings are wiped from memory on
//! teardown.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use zeroize::Zeroize;

use crate::api::client::ApiClient;
use crate::api::types::{FileRecord, ProcessedRecord, User};
use crate::storage::{SessionStorage, StorageError, REFRESH_TOKEN_KEY, TOKEN_KEY, USER_KEY};

/// Client state shared across concurrent actions.
///
/// Constructed explicitly and passed by reference (or `Arc`) to the action
/// functions; there is no process-wide singleton. Invariant:
/// `is_authenticated() == access_token().is_some()`.
pub struct AppState {
    /// HTTP client for backend communication.
    pub api: Arc<ApiClient>,

    /// Durable shadow of the session.
    storage: Arc<dyn SessionStorage>,

    /// Cached file list, replaced wholesale on fetch.
    files: RwLock<Vec<FileRecord>>,

    /// The file detail currently being viewed.
    current_file: RwLock<Option<FileRecord>>,

    /// Processed rows for the currently viewed file.
    processed_data: RwLock<Vec<ProcessedRecord>>,

    /// Number of actions currently awaiting the network. `is_loading()`
    /// derives from this, so concurrent actions cannot clear each other's
    /// loading state.
    in_flight: AtomicUsize,

    /// Error payload of the most recently failed action (last write wins).
    error: RwLock<Option<Value>>,

    /// Bearer token for authorized requests.
    access_token: RwLock<Option<String>>,

    /// Longer-lived credential used to mint new access tokens.
    refresh_token: RwLock<Option<String>>,

    /// The authenticated account.
    user: RwLock<Option<User>>,

    /// Whether a session is held.
    is_authenticated: RwLock<bool>,
}

impl AppState {
    /// Create an unauthenticated state talking to the given base URL, with
    /// the given session storage. Call [`AppState::restore`] afterwards to
    /// pick up a persisted session.
    pub fn new(api_base_url: &str, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            api: Arc::new(ApiClient::new(api_base_url)),
            storage,
            files: RwLock::new(Vec::new()),
            current_file: RwLock::new(None),
            processed_data: RwLock::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            error: RwLock::new(None),
            access_token: RwLock::new(None),
            refresh_token: RwLock::new(None),
            user: RwLock::new(None),
            is_authenticated: RwLock::new(false),
        }
    }

    /// Hydrate the session from persistent storage.
    ///
    /// The stored access token seeds the authenticated state; refresh token
    /// and user ride along when present. A stored user entry that fails to
    /// parse is ignored with a warning rather than blocking startup.
    ///
    /// Returns `true` when a session was restored.
    pub async fn restore(&self) -> Result<bool, StorageError> {
        let Some(token) = self.storage.get(TOKEN_KEY)? else {
            return Ok(false);
        };
        let refresh = self.storage.get(REFRESH_TOKEN_KEY)?;
        let user: Option<User> = match self.storage.get(USER_KEY)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    log::warn!("Stored user entry is not valid JSON, ignoring: {}", e);
                    None
                }
            },
            None => None,
        };

        self.api.set_access_token(token.clone()).await;
        *self.access_token.write().await = Some(token);
        *self.refresh_token.write().await = refresh;
        *self.user.write().await = user;
        *self.is_authenticated.write().await = true;

        log::info!("Session restored from storage");
        Ok(true)
    }

    // ── Readable accessors ───────────────────────────────────────────────

    pub async fn is_authenticated(&self) -> bool {
        *self.is_authenticated.read().await
    }

    pub async fn access_token(&self) -> Option<String> {
        self.access_token.read().await.clone()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.refresh_token.read().await.clone()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    pub async fn files(&self) -> Vec<FileRecord> {
        self.files.read().await.clone()
    }

    pub async fn current_file(&self) -> Option<FileRecord> {
        self.current_file.read().await.clone()
    }

    pub async fn processed_data(&self) -> Vec<ProcessedRecord> {
        self.processed_data.read().await.clone()
    }

    /// Whether any action is awaiting the network.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Error payload of the most recently failed action. Under concurrent
    /// actions the last failure to settle wins.
    pub async fn last_error(&self) -> Option<Value> {
        self.error.read().await.clone()
    }

    // ── Mutation primitives ──────────────────────────────────────────────

    /// Replace the cached file list.
    pub async fn set_files(&self, files: Vec<FileRecord>) {
        *self.files.write().await = files;
    }

    /// Replace the currently viewed file detail.
    pub async fn set_current_file(&self, file: FileRecord) {
        *self.current_file.write().await = Some(file);
    }

    /// Replace the processed-data rows.
    pub async fn set_processed_data(&self, data: Vec<ProcessedRecord>) {
        *self.processed_data.write().await = data;
    }

    /// Replace the shared error field.
    pub async fn set_error(&self, error: Option<Value>) {
        *self.error.write().await = error;
    }

    /// Install a session and write it through to persistent storage.
    ///
    /// Storage is written before memory is touched: a failed write leaves
    /// the in-memory session unchanged.
    pub async fn set_session(
        &self,
        access: String,
        refresh: String,
        user: Option<User>,
    ) -> Result<(), StorageError> {
        self.storage.set(TOKEN_KEY, &access)?;
        self.storage.set(REFRESH_TOKEN_KEY, &refresh)?;
        match user {
            Some(ref user) => {
                let encoded = serde_json::to_string(user)
                    .map_err(|e| StorageError::OperationFailed(e.to_string()))?;
                self.storage.set(USER_KEY, &encoded)?;
            }
            None => self.storage.remove(USER_KEY)?,
        }

        self.api.set_access_token(access.clone()).await;
        *self.access_token.write().await = Some(access);
        *self.refresh_token.write().await = Some(refresh);
        *self.user.write().await = user;
        *self.is_authenticated.write().await = true;
        Ok(())
    }

    /// Replace the session's user object and its storage shadow.
    pub async fn set_user(&self, user: User) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(&user)
            .map_err(|e| StorageError::OperationFailed(e.to_string()))?;
        self.storage.set(USER_KEY, &encoded)?;
        *self.user.write().await = Some(user);
        Ok(())
    }

    /// Wipe and clear the whole session.
    ///
    /// Token strings are zeroed before being dropped. Storage removals are
    /// best-effort: a failing credential store is logged, never surfaced,
    /// so logout cannot fail.
    pub async fn clear_session(&self) {
        {
            let mut token = self.access_token.write().await;
            if let Some(ref mut t) = *token {
                t.zeroize();
            }
            *token = None;
        }
        {
            let mut token = self.refresh_token.write().await;
            if let Some(ref mut t) = *token {
                t.zeroize();
            }
            *token = None;
        }
        *self.user.write().await = None;
        *self.is_authenticated.write().await = false;
        self.api.clear_access_token().await;

        for key in [TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                log::warn!("Failed to remove session key {:?}: {}", key, e);
            }
        }
    }

    // ── Request guards ───────────────────────────────────────────────────

    /// Mark an action in-flight and clear the last error.
    pub(crate) async fn begin_request(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        *self.error.write().await = None;
    }

    /// Settle an action: record its error payload (if any) and drop the
    /// in-flight mark.
    pub(crate) async fn end_request(&self, error: Option<Value>) {
        if error.is_some() {
            *self.error.write().await = error;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use serde_json::json;

    fn make_user(id: u64, username: &str) -> User {
        User {
            id,
            username: username.to_string(),
            email: format!("{}@example.com", username),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    fn make_state() -> (AppState, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let state = AppState::new("http://localhost:8000/api", storage.clone());
        (state, storage)
    }

    #[tokio::test]
    async fn set_session_persists_all_keys() {
        let (state, storage) = make_state();

        state
            .set_session("T1".into(), "R1".into(), Some(make_user(1, "ada")))
            .await
            .unwrap();

        assert!(state.is_authenticated().await);
        assert_eq!(state.access_token().await.as_deref(), Some("T1"));
        assert_eq!(state.refresh_token().await.as_deref(), Some("R1"));
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("T1"));
        assert_eq!(
            storage.get(REFRESH_TOKEN_KEY).unwrap().as_deref(),
            Some("R1")
        );
        let stored_user: User =
            serde_json::from_str(&storage.get(USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored_user, make_user(1, "ada"));
    }

    #[tokio::test]
    async fn clear_session_removes_all_keys() {
        let (state, storage) = make_state();
        state
            .set_session("T1".into(), "R1".into(), Some(make_user(1, "ada")))
            .await
            .unwrap();

        state.clear_session().await;

        assert!(!state.is_authenticated().await);
        assert_eq!(state.access_token().await, None);
        assert_eq!(state.refresh_token().await, None);
        assert_eq!(state.current_user().await, None);
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(REFRESH_TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn clear_session_is_idempotent() {
        let (state, _storage) = make_state();
        state.clear_session().await;
        state.clear_session().await;
        assert!(!state.is_authenticated().await);
    }

    #[tokio::test]
    async fn restore_seeds_session_from_storage() {
        let (state, storage) = make_state();
        storage.set(TOKEN_KEY, "T1").unwrap();
        storage.set(REFRESH_TOKEN_KEY, "R1").unwrap();
        storage
            .set(
                USER_KEY,
                &serde_json::to_string(&make_user(7, "grace")).unwrap(),
            )
            .unwrap();

        assert!(state.restore().await.unwrap());
        assert!(state.is_authenticated().await);
        assert_eq!(state.access_token().await.as_deref(), Some("T1"));
        assert_eq!(state.current_user().await, Some(make_user(7, "grace")));
    }

    #[tokio::test]
    async fn restore_without_token_leaves_state_unauthenticated() {
        let (state, storage) = make_state();
        // A refresh token alone does not make a session.
        storage.set(REFRESH_TOKEN_KEY, "R1").unwrap();

        assert!(!state.restore().await.unwrap());
        assert!(!state.is_authenticated().await);
        assert_eq!(state.access_token().await, None);
    }

    #[tokio::test]
    async fn restore_tolerates_corrupt_user_entry() {
        let (state, storage) = make_state();
        storage.set(TOKEN_KEY, "T1").unwrap();
        storage.set(USER_KEY, "{not json").unwrap();

        assert!(state.restore().await.unwrap());
        assert!(state.is_authenticated().await);
        assert_eq!(state.current_user().await, None);
    }

    #[tokio::test]
    async fn set_files_replaces_wholesale() {
        let (state, _storage) = make_state();
        let file = FileRecord {
            id: 1,
            title: "yields".into(),
            file: None,
            file_url: None,
            uploaded_by: None,
            uploaded_at: "2026-01-01T00:00:00Z".into(),
            processed: false,
        };

        state.set_files(vec![file.clone()]).await;
        assert_eq!(state.files().await, vec![file.clone()]);

        state.set_files(Vec::new()).await;
        assert!(state.files().await.is_empty());

        state.set_current_file(file.clone()).await;
        assert_eq!(state.current_file().await, Some(file));
    }

    #[tokio::test]
    async fn request_guards_drive_loading_and_error() {
        let (state, _storage) = make_state();
        assert!(!state.is_loading());

        state.begin_request().await;
        assert!(state.is_loading());

        // A second overlapping action keeps loading set after the first settles.
        state.begin_request().await;
        state.end_request(Some(json!({"detail": "boom"}))).await;
        assert!(state.is_loading());
        assert_eq!(state.last_error().await, Some(json!({"detail": "boom"})));

        state.end_request(None).await;
        assert!(!state.is_loading());
        // A successful settle does not erase the recorded error.
        assert_eq!(state.last_error().await, Some(json!({"detail": "boom"})));

        // The next action clears it on entry.
        state.begin_request().await;
        assert_eq!(state.last_error().await, None);
        state.end_request(None).await;
    }
}
