//! In-memory credential storage implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{CredentialKey, CredentialStore, Secret, StoreError};

/// In-memory credential store for testing and development.
///
/// This store is not persistent; data is lost when the process exits.
/// Interior mutability via `RwLock` makes it safe to share across tasks.
pub struct MemoryStore {
    data: RwLock<HashMap<CredentialKey, Secret>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Create a memory store pre-populated with the given slots.
    pub fn with_credentials(
        entries: impl IntoIterator<Item = (CredentialKey, Secret)>,
    ) -> Self {
        Self {
            data: RwLock::new(entries.into_iter().collect()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("slots", &self.data.read().len())
            .finish()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<Secret>, StoreError> {
        Ok(self.data.read().get(&key).cloned())
    }

    async fn set(&self, key: CredentialKey, secret: &Secret) -> Result<(), StoreError> {
        self.data.write().insert(key, secret.clone());
        Ok(())
    }

    async fn delete(&self, key: CredentialKey) -> Result<(), StoreError> {
        self.data.write().remove(&key);
        Ok(())
    }
}
