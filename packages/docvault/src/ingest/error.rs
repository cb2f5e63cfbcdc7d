use common::storage::StorageError;
use sea_orm::DbErr;

/// Why an ingestion did not produce a document.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The caller sent something unusable (missing file name, blank owner, bad name).
    #[error("{0}")]
    InvalidInput(String),
    #[error("Document {0} not found")]
    NotFound(i32),
    #[error("{0}")]
    Storage(#[source] StorageError),
    /// The raw driver error is kept as the source for logging, never displayed.
    #[error("database operation failed")]
    Persistence(#[from] DbErr),
}

impl From<StorageError> for IngestError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidName(reason) => Self::InvalidInput(reason.message().into()),
            other => Self::Storage(other),
        }
    }
}
