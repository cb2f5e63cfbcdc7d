use chrono::Utc;
use common::storage::{BlobStore, StagedBlob};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{error, info, instrument, warn};

use super::error::IngestError;
use crate::entity::audit_trail::{ACTION_CREATED, ACTION_UPDATED};
use crate::entity::{document, document_version};
use crate::repository::{AuditRepository, DocumentRepository, VersionRepository};

/// Namespace of the blob store that holds revisions after the first.
pub const REVISIONS_NAMESPACE: &str = "versions";

/// A document together with the version an ingestion just wrote.
#[derive(Debug, Clone)]
pub struct IngestedDocument {
    pub document: document::Model,
    pub version: document_version::Model,
}

/// Blob name for revision `version` of a document in the revision store.
pub fn revision_blob_name(document_id: i32, version: i32) -> String {
    format!("{document_id}-v{version}")
}

/// Turns uploaded bytes into a stored blob plus document metadata.
///
/// Version 1 of a document is stored in `blob_store` under the uploaded file
/// name. Later versions go to `revision_store`, which uploaded names cannot
/// address, so a revision never replaces another document's content.
///
/// Bytes are staged first and only promoted to their final name once the
/// metadata rows are written, so a failed ingestion leaves neither rows nor a
/// visible blob behind.
pub struct IngestionService<'a> {
    db: &'a DatabaseConnection,
    blob_store: &'a dyn BlobStore,
    revision_store: &'a dyn BlobStore,
}

impl<'a> IngestionService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        blob_store: &'a dyn BlobStore,
        revision_store: &'a dyn BlobStore,
    ) -> Self {
        Self {
            db,
            blob_store,
            revision_store,
        }
    }

    /// Create a new document at version 1.
    ///
    /// `original_name` and `owner` are recorded exactly as given; blank
    /// values are rejected.
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn ingest(
        &self,
        data: &[u8],
        original_name: Option<&str>,
        owner: &str,
        performed_by: &str,
    ) -> Result<IngestedDocument, IngestError> {
        let name = original_name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| IngestError::InvalidInput("Uploaded file has no name".into()))?;
        if owner.trim().is_empty() {
            return Err(IngestError::InvalidInput("Owner must not be empty".into()));
        }

        // Resolving first rejects a bad name before anything touches the disk.
        let file_path = self.blob_store.path_for(name)?;
        let staged = self.blob_store.stage(data).await?;
        let size = staged.size();

        let now = Utc::now();
        let written = async {
            let txn = self.db.begin().await?;
            let document = DocumentRepository::new(&txn).insert(name, owner, now).await?;
            let version = VersionRepository::new(&txn)
                .insert(document.id, &file_path.to_string_lossy(), 1, now)
                .await?;
            AuditRepository::new(&txn)
                .record(document.id, ACTION_CREATED, performed_by, now)
                .await?;
            Ok::<_, IngestError>((txn, IngestedDocument { document, version }))
        }
        .await;

        let (txn, ingested) = match written {
            Ok(written) => written,
            Err(e) => {
                discard(self.blob_store, staged).await;
                return Err(e);
            }
        };

        publish(self.blob_store, txn, staged, name).await?;

        info!(
            document_id = ingested.document.id,
            name = %ingested.document.name,
            owner = %ingested.document.owner,
            size,
            "Document ingested"
        );
        Ok(ingested)
    }

    /// Store new content for an existing document as the next version.
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn ingest_revision(
        &self,
        document_id: i32,
        data: &[u8],
        performed_by: &str,
    ) -> Result<IngestedDocument, IngestError> {
        let txn = self.db.begin().await?;

        // The row lock serializes concurrent revisions of one document where
        // the backend supports it; the (document_id, version) key backs it up.
        let document = DocumentRepository::new(&txn)
            .find_by_id_for_update(document_id)
            .await?
            .ok_or(IngestError::NotFound(document_id))?;

        let versions = VersionRepository::new(&txn);
        let next = versions.next_version(document_id).await?;
        let blob_name = revision_blob_name(document_id, next);
        let file_path = self.revision_store.path_for(&blob_name)?;
        let staged = self.revision_store.stage(data).await?;
        let size = staged.size();

        let now = Utc::now();
        let written = async {
            let version = versions
                .insert(document_id, &file_path.to_string_lossy(), next, now)
                .await?;
            AuditRepository::new(&txn)
                .record(document_id, ACTION_UPDATED, performed_by, now)
                .await?;
            Ok::<_, IngestError>(version)
        }
        .await;

        let version = match written {
            Ok(version) => version,
            Err(e) => {
                discard(self.revision_store, staged).await;
                return Err(e);
            }
        };

        publish(self.revision_store, txn, staged, &blob_name).await?;

        info!(
            document_id,
            version = version.version,
            size,
            "Document revision ingested"
        );
        Ok(IngestedDocument { document, version })
    }
}

/// Promote the staged blob, then commit the metadata that points at it.
async fn publish(
    store: &dyn BlobStore,
    txn: DatabaseTransaction,
    staged: StagedBlob,
    name: &str,
) -> Result<(), IngestError> {
    if let Err(e) = store.promote(staged, name).await {
        if let Err(rollback) = txn.rollback().await {
            error!(error = %rollback, "Rollback after failed promote also failed");
        }
        return Err(e.into());
    }

    if let Err(e) = txn.commit().await {
        warn!(name, error = %e, "Metadata commit failed, removing promoted blob");
        if let Err(cleanup) = store.delete(name).await {
            error!(name, error = %cleanup, "Failed to remove orphaned blob");
        }
        return Err(e.into());
    }

    Ok(())
}

async fn discard(store: &dyn BlobStore, staged: StagedBlob) {
    if let Err(e) = store.discard(staged).await {
        warn!(error = %e, "Failed to discard staged blob");
    }
}
