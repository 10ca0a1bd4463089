//! Credential storage abstraction.
//!
//! This module provides:
//! - [`Secret`] - A wrapper for sensitive values that prevents accidental logging
//! - [`CredentialKey`] - The three credential slots the client persists
//! - [`CredentialStore`] - Trait for credential storage backends
//! - [`FileStore`] - One plain-text file per slot, the default backend
//! - [`MemoryStore`] - In-memory implementation for testing
//! - [`KeyringStore`] - OS keyring implementation (with `keyring-store` feature)
//! - [`create_store`] - Helper to select backend based on availability
//!
//! Each slot holds a single free-standing string. Absence (`Ok(None)`) is a
//! valid state distinct from an empty value; no relational integrity is
//! enforced between the slots.
//!
//! # Example
//!
//! ```rust,ignore
//! use tillpoint_core::store::{CredentialKey, CredentialStore, FileStore, Secret};
//!
//! let store = FileStore::new("/var/lib/tillpoint");
//!
//! store.set(CredentialKey::AccessToken, &Secret::new("abc123")).await.unwrap();
//!
//! let token = store.get(CredentialKey::AccessToken).await.unwrap();
//! assert_eq!(token.unwrap().expose(), "abc123");
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroize;

mod file;
#[cfg(feature = "keyring-store")]
mod keyring;
mod memory;

pub use file::FileStore;
#[cfg(feature = "keyring-store")]
pub use keyring::KeyringStore;
pub use memory::MemoryStore;

/// A secret value that prevents accidental exposure in logs.
///
/// The inner value is only accessible via [`expose()`](Secret::expose).
/// Debug and Display implementations show `[REDACTED]` instead of the value,
/// and the backing memory is zeroed on drop.
#[derive(Clone, Serialize, Deserialize)]
pub struct Secret(String);

impl Secret {
    /// Create a new secret from a string value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the secret value.
    ///
    /// Use sparingly and never log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Consume the secret and return the inner value.
    pub fn into_inner(mut self) -> String {
        std::mem::take(&mut self.0)
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret([REDACTED])")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Secret {}

/// The credential slots persisted by the client.
///
/// Each slot is stored independently; the host is written once during setup
/// while the two tokens are overwritten together after every login or refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialKey {
    /// Tenant/routing identifier sent as the HTTP `Host` header.
    Host,
    /// Short-lived credential authorizing API calls.
    AccessToken,
    /// Longer-lived credential exchanged for a new token pair.
    RefreshToken,
}

impl CredentialKey {
    /// All slots, in a stable order.
    pub const ALL: [CredentialKey; 3] = [
        CredentialKey::Host,
        CredentialKey::AccessToken,
        CredentialKey::RefreshToken,
    ];

    /// Get the slot name as a string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::Host => "host",
            CredentialKey::AccessToken => "access_token",
            CredentialKey::RefreshToken => "refresh_token",
        }
    }

    /// File name used by the [`FileStore`] backend for this slot.
    pub fn file_name(&self) -> &'static str {
        match self {
            CredentialKey::Host => "host_config.txt",
            CredentialKey::AccessToken => "access_token.txt",
            CredentialKey::RefreshToken => "refresh_token.txt",
        }
    }
}

impl std::fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error type for credential store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading a slot failed for a reason other than absence.
    #[error("failed to read {key} slot: {source}")]
    Read {
        key: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Writing a slot failed. Fatal to the calling operation.
    #[error("failed to write {key} slot: {source}")]
    Write {
        key: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Deleting a slot failed.
    #[error("failed to delete {key} slot: {source}")]
    Delete {
        key: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The storage backend encountered an error.
    #[error("backend error: {message}")]
    Backend { message: String },

    /// The keyring backend is not available.
    #[error("keyring not available: {message}")]
    KeyringUnavailable { message: String },
}

/// Abstraction over credential storage backends.
///
/// The store exclusively owns the durable representation; callers read a
/// value, use it for a single request, and drop it. Writes overwrite the
/// whole slot so a reader never observes a partially-written value.
///
/// Implementations include:
/// - [`FileStore`] - One text file per slot (default)
/// - [`MemoryStore`] - In-memory storage for testing
/// - [`KeyringStore`] (with `keyring-store` feature) - OS keyring
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Retrieve a credential, trimmed of surrounding whitespace.
    ///
    /// Returns `Ok(None)` if the slot has never been written. An absent slot
    /// is not an error.
    async fn get(&self, key: CredentialKey) -> Result<Option<Secret>, StoreError>;

    /// Store a credential, overwriting any existing value.
    async fn set(&self, key: CredentialKey, secret: &Secret) -> Result<(), StoreError>;

    /// Delete a credential.
    ///
    /// Returns `Ok(())` even if the slot was never written.
    async fn delete(&self, key: CredentialKey) -> Result<(), StoreError>;

    /// Check whether a slot holds a value without retrieving it.
    async fn exists(&self, key: CredentialKey) -> Result<bool, StoreError> {
        Ok(self.get(key).await?.is_some())
    }
}

/// Create a credential store with automatic backend selection.
///
/// When `prefer_keyring` is `true` and the `keyring-store` feature is
/// enabled, attempts the OS keyring and falls back to slot files under
/// `data_dir` if it is unavailable. Register machines in the field are
/// frequently headless kiosks without a keyring daemon, so the file backend
/// is the default.
pub fn create_store(
    data_dir: impl Into<std::path::PathBuf>,
    prefer_keyring: bool,
) -> std::sync::Arc<dyn CredentialStore> {
    #[cfg(feature = "keyring-store")]
    if prefer_keyring {
        match KeyringStore::try_new("tillpoint") {
            Ok(store) => {
                tracing::info!("using OS keyring for credential storage");
                return std::sync::Arc::new(store);
            }
            Err(e) => {
                tracing::warn!(
                    "keyring unavailable ({}), falling back to credential files",
                    e
                );
            }
        }
    }

    #[cfg(not(feature = "keyring-store"))]
    if prefer_keyring {
        tracing::warn!(
            "keyring storage requested but keyring-store feature not enabled, \
             using credential files"
        );
    }

    tracing::debug!("using file-backed credential storage");
    std::sync::Arc::new(FileStore::new(data_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_debug_redacted() {
        let secret = Secret::new("super-secret");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn secret_display_redacted() {
        let secret = Secret::new("super-secret");
        let display = format!("{}", secret);
        assert!(!display.contains("super-secret"));
        assert!(display.contains("REDACTED"));
    }

    #[test]
    fn secret_into_inner_round_trip() {
        let secret = Secret::new("value");
        assert_eq!(secret.into_inner(), "value");
    }

    #[test]
    fn credential_key_names_are_stable() {
        assert_eq!(CredentialKey::Host.file_name(), "host_config.txt");
        assert_eq!(CredentialKey::AccessToken.file_name(), "access_token.txt");
        assert_eq!(CredentialKey::RefreshToken.file_name(), "refresh_token.txt");
    }

    #[tokio::test]
    async fn create_store_file_fallback_is_usable() {
        let dir = tempfile::tempdir().unwrap();
        let store = create_store(dir.path(), false);

        store
            .set(CredentialKey::Host, &Secret::new("shop.api.localhost"))
            .await
            .unwrap();
        let retrieved = store.get(CredentialKey::Host).await.unwrap();
        assert_eq!(retrieved.unwrap().expose(), "shop.api.localhost");
    }
}
