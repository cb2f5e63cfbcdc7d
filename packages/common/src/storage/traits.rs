use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::error::StorageError;

/// Bytes written to a private location that are not yet visible under a name.
///
/// A staged blob must be either promoted or discarded.
#[derive(Debug)]
#[must_use = "a staged blob must be promoted or discarded"]
pub struct StagedBlob {
    temp_path: PathBuf,
    size: u64,
}

impl StagedBlob {
    pub fn new(temp_path: PathBuf, size: u64) -> Self {
        Self { temp_path, size }
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Size of the staged content in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Name-addressed blob storage.
///
/// Storing under a name that already exists replaces the previous content.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under `name` and return the path they were written to.
    async fn put(&self, data: &[u8], name: &str) -> Result<PathBuf, StorageError> {
        let staged = self.stage(data).await?;
        self.promote(staged, name).await
    }

    /// Write bytes to a private temporary location.
    async fn stage(&self, data: &[u8]) -> Result<StagedBlob, StorageError>;

    /// Make a staged blob visible under `name`, replacing any previous blob of that name.
    async fn promote(&self, staged: StagedBlob, name: &str) -> Result<PathBuf, StorageError>;

    /// Drop a staged blob without publishing it.
    async fn discard(&self, staged: StagedBlob) -> Result<(), StorageError>;

    /// Resolve where a blob named `name` lives, without touching the disk.
    fn path_for(&self, name: &str) -> Result<PathBuf, StorageError>;

    /// Retrieve all bytes stored under `name`.
    async fn get(&self, name: &str) -> Result<Vec<u8>, StorageError>;

    /// Check whether a blob exists.
    async fn exists(&self, name: &str) -> Result<bool, StorageError>;

    /// Delete the blob stored under `name`.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, StorageError>;
}
