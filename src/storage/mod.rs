//! Persistent session storage.
//!
//! The store keeps a durable shadow of the session (access token, refresh
//! token, JSON-encoded user) under three fixed keys. The [`SessionStorage`]
//! trait abstracts the backing store so tests can inject an in-memory
//! implementation; production code uses the OS credential store.

pub mod keychain;
pub mod memory;

pub use keychain::KeychainStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Storage key for the access token. Its presence marks a restorable session.
pub const TOKEN_KEY: &str = "token";

/// Storage key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Storage key for the JSON-encoded user object.
pub const USER_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage operation failed: {0}")]
    OperationFailed(String),
}

/// Key-value persistence for the session shadow.
///
/// Implementations store opaque strings by key. `get` returns `None` for a
/// missing key; `remove` is idempotent.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
