//! OS keyring-backed credential storage implementation.

use async_trait::async_trait;
use keyring::Entry;

use super::{CredentialKey, CredentialStore, Secret, StoreError};

/// OS keyring-backed credential store.
///
/// This store uses the platform's native keyring service:
/// - macOS: Keychain
/// - Linux: Secret Service API (via libsecret)
/// - Windows: Credential Manager
///
/// Each slot is stored as an entry named `{service_name}/{slot}`. On headless
/// machines without a keyring daemon, prefer [`FileStore`](super::FileStore).
pub struct KeyringStore {
    service_name: String,
}

impl KeyringStore {
    /// Create a new keyring store with the given service name.
    ///
    /// # Panics
    ///
    /// Panics if the keyring backend is not available on this platform.
    /// Use [`try_new`](Self::try_new) for a non-panicking version.
    pub fn new(service_name: &str) -> Self {
        Self::try_new(service_name).expect("keyring backend not available")
    }

    /// Try to create a new keyring store.
    ///
    /// Returns an error if the keyring backend is not available on this
    /// platform.
    pub fn try_new(service_name: &str) -> Result<Self, StoreError> {
        // Probe availability before handing out a store.
        match Entry::new(service_name, "availability_check") {
            Ok(_) => Ok(Self {
                service_name: service_name.to_string(),
            }),
            Err(e) => Err(StoreError::KeyringUnavailable {
                message: format!("keyring backend not available: {}", e),
            }),
        }
    }

    fn entry(&self, key: CredentialKey) -> Result<Entry, StoreError> {
        let service = format!("{}/{}", self.service_name, key.as_str());
        Entry::new(&service, "tillpoint").map_err(|e| StoreError::Backend {
            message: format!("failed to create keyring entry: {}", e),
        })
    }
}

impl std::fmt::Debug for KeyringStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyringStore")
            .field("service_name", &self.service_name)
            .finish()
    }
}

#[async_trait]
impl CredentialStore for KeyringStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<Secret>, StoreError> {
        let entry = self.entry(key)?;

        match entry.get_password() {
            Ok(password) => Ok(Some(Secret::new(password.trim()))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(keyring::Error::Ambiguous(_)) => Err(StoreError::Backend {
                message: format!("ambiguous keyring entry for slot: {}", key),
            }),
            Err(e) => Err(StoreError::Backend {
                message: format!("keyring error: {}", e),
            }),
        }
    }

    async fn set(&self, key: CredentialKey, secret: &Secret) -> Result<(), StoreError> {
        let entry = self.entry(key)?;

        entry
            .set_password(secret.expose())
            .map_err(|e| StoreError::Backend {
                message: format!("failed to set keyring password: {}", e),
            })
    }

    async fn delete(&self, key: CredentialKey) -> Result<(), StoreError> {
        let entry = self.entry(key)?;

        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // Idempotent delete
            Err(e) => Err(StoreError::Backend {
                message: format!("failed to delete keyring entry: {}", e),
            }),
        }
    }
}
