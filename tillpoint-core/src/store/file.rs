//! File-backed credential storage.
//!
//! The default backend: one UTF-8 text file per credential slot under a data
//! directory. This matches how an interactive client machine is provisioned
//! in the field, where the host file is edited once during setup and the two
//! token files are rewritten on every login or refresh.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{CredentialKey, CredentialStore, Secret, StoreError};

/// Credential store that keeps one plain-text file per slot.
///
/// Reads trim surrounding whitespace so hand-edited files (trailing newline
/// from an editor) round-trip cleanly. Writes go through a temporary file
/// followed by a rename, so a concurrent reader never observes a partially
/// written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory is created on first write, not here.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing the given slot.
    pub fn path(&self, key: CredentialKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// The directory holding the slot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<Secret>, StoreError> {
        match fs::read_to_string(self.path(key)).await {
            Ok(contents) => Ok(Some(Secret::new(contents.trim()))),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Read {
                key: key.as_str(),
                source: err,
            }),
        }
    }

    async fn set(&self, key: CredentialKey, secret: &Secret) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            key: key.as_str(),
            source,
        };

        fs::create_dir_all(&self.dir).await.map_err(write_err)?;

        let tmp = self.dir.join(format!(".{}.tmp", key.file_name()));
        fs::write(&tmp, secret.expose()).await.map_err(write_err)?;
        fs::rename(&tmp, self.path(key)).await.map_err(write_err)?;

        tracing::debug!(slot = %key, "credential slot written");
        Ok(())
    }

    async fn delete(&self, key: CredentialKey) -> Result<(), StoreError> {
        match fs::remove_file(self.path(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::Delete {
                key: key.as_str(),
                source: err,
            }),
        }
    }
}
