mod error;
mod filename;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use filename::{FilenameError, validate_blob_name};
pub use traits::{BlobStore, StagedBlob};
