mod error;
mod service;

pub use error::IngestError;
pub use service::{IngestedDocument, IngestionService, REVISIONS_NAMESPACE, revision_blob_name};
