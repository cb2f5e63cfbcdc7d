use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Blob storage configuration shared by every component that touches uploaded content.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding stored blobs. Default: "uploads".
    #[serde(default = "default_content_root")]
    pub content_root: PathBuf,
    /// Largest accepted blob in bytes. Default: 64 MiB.
    #[serde(default = "default_max_blob_size")]
    pub max_blob_size: u64,
    /// Upper bound on a single staging write, in seconds. Default: 30.
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,
}

fn default_content_root() -> PathBuf {
    PathBuf::from("uploads")
}
fn default_max_blob_size() -> u64 {
    64 * 1024 * 1024
}
fn default_write_timeout_secs() -> u64 {
    30
}

impl StorageConfig {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            content_root: default_content_root(),
            max_blob_size: default_max_blob_size(),
            write_timeout_secs: default_write_timeout_secs(),
        }
    }
}
