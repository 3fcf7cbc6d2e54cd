//! Session persistence in the OS credential store.
//!
//! Uses the `keyring` crate (macOS Keychain, Windows Credential Manager,
//! Linux keyutils). Tokens never land in a plain file on disk.

use keyring::Entry;

use super::{SessionStorage, StorageError};

/// Service name under which session keys are stored.
const SERVICE_NAME: &str = "com.aquagreen.client";

/// Credential-store backed [`SessionStorage`].
pub struct KeychainStorage {
    service: String,
}

impl KeychainStorage {
    /// Storage under the default service name.
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Storage under a custom service name (parallel installs, staging
    /// environments).
    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }
}

impl Default for KeychainStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl From<keyring::Error> for StorageError {
    fn from(err: keyring::Error) -> Self {
        StorageError::OperationFailed(err.to_string())
    }
}

impl SessionStorage for KeychainStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entry = Entry::new(&self.service, key)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let entry = Entry::new(&self.service, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let entry = Entry::new(&self.service, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // already absent, idempotent
            Err(e) => Err(e.into()),
        }
    }
}
