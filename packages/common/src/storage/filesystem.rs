use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;

use super::error::StorageError;
use super::filename::validate_blob_name;
use super::traits::{BlobStore, StagedBlob};

const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Filesystem-backed blob store.
///
/// Blobs live directly under the content root as `{base_path}/{name}`.
/// Writes go to `{base_path}/.tmp/{uuid}` first and are renamed into place,
/// so a reader never observes a half-written blob.
pub struct FilesystemBlobStore {
    base_path: PathBuf,
    max_size: u64,
    write_timeout: Duration,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        })
    }

    /// Bound the time a single staging write may take.
    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    pub fn base_path(&self) -> &std::path::Path {
        &self.base_path
    }

    /// A store rooted at `.{name}` inside this one, with the same limits.
    ///
    /// Blob names never start with a dot, so nothing put through this store
    /// can reach a blob in the namespace. `tmp` is reserved for staging.
    pub async fn namespace(&self, name: &str) -> Result<Self, StorageError> {
        let name = validate_blob_name(name)?;
        let store = Self::new(self.base_path.join(format!(".{name}")), self.max_size).await?;
        Ok(store.with_write_timeout(self.write_timeout))
    }

    fn temp_dir(&self) -> PathBuf {
        self.base_path.join(".tmp")
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.temp_dir().join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn stage(&self, data: &[u8]) -> Result<StagedBlob, StorageError> {
        let size = data.len() as u64;
        if size > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: size,
                limit: self.max_size,
            });
        }

        // The content root may have been removed since startup.
        fs::create_dir_all(self.temp_dir()).await?;

        let temp_path = self.temp_path();
        match tokio::time::timeout(self.write_timeout, fs::write(&temp_path, data)).await {
            Ok(Ok(())) => Ok(StagedBlob::new(temp_path, size)),
            Ok(Err(e)) => {
                let _ = fs::remove_file(&temp_path).await;
                Err(e.into())
            }
            Err(_) => {
                let _ = fs::remove_file(&temp_path).await;
                tracing::warn!(timeout = ?self.write_timeout, "Blob staging write timed out");
                Err(StorageError::Timeout(self.write_timeout))
            }
        }
    }

    async fn promote(&self, staged: StagedBlob, name: &str) -> Result<PathBuf, StorageError> {
        let blob_path = match self.path_for(name) {
            Ok(path) => path,
            Err(e) => {
                let _ = fs::remove_file(staged.temp_path()).await;
                return Err(e);
            }
        };

        fs::create_dir_all(&self.base_path).await?;

        if let Err(e) = fs::rename(staged.temp_path(), &blob_path).await {
            let _ = fs::remove_file(staged.temp_path()).await;
            return Err(e.into());
        }

        Ok(blob_path)
    }

    async fn discard(&self, staged: StagedBlob) -> Result<(), StorageError> {
        match fs::remove_file(staged.temp_path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StorageError> {
        let name = validate_blob_name(name)?;
        Ok(self.base_path.join(name))
    }

    async fn get(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let blob_path = self.path_for(name)?;
        match fs::read(&blob_path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        let blob_path = self.path_for(name)?;
        Ok(fs::try_exists(&blob_path).await?)
    }

    async fn delete(&self, name: &str) -> Result<bool, StorageError> {
        let blob_path = self.path_for(name)?;
        match fs::remove_file(&blob_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
