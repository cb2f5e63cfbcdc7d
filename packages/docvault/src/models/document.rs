use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{audit_trail, document, document_version};

/// A document and where its latest content lives.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    #[schema(example = 1)]
    pub id: i32,
    /// Original upload filename.
    #[schema(example = "test-document.txt")]
    pub name: String,
    #[schema(example = "JohnDoe")]
    pub owner: String,
    pub created_at: DateTime<Utc>,
    /// Highest version number, absent if the document has no versions.
    #[schema(example = 1)]
    pub latest_version: Option<i32>,
    /// Blob store location of the latest version.
    #[schema(example = "uploads/test-document.txt")]
    pub file_path: Option<String>,
}

impl DocumentResponse {
    pub fn new(document: document::Model, latest: Option<document_version::Model>) -> Self {
        let (latest_version, file_path) = match latest {
            Some(v) => (Some(v.version), Some(v.file_path)),
            None => (None, None),
        };
        Self {
            id: document.id,
            name: document.name,
            owner: document.owner,
            created_at: document.created_at,
            latest_version,
            file_path,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 1)]
    pub version: i32,
    #[schema(example = "uploads/test-document.txt")]
    pub file_path: String,
    pub uploaded_at: DateTime<Utc>,
    #[schema(example = 1)]
    pub document_id: i32,
}

impl From<document_version::Model> for VersionResponse {
    fn from(model: document_version::Model) -> Self {
        Self {
            id: model.id,
            version: model.version,
            file_path: model.file_path,
            uploaded_at: model.uploaded_at,
            document_id: model.document_id,
        }
    }
}

/// Versions of one document, newest first.
#[derive(Serialize, utoipa::ToSchema)]
pub struct VersionListResponse {
    pub versions: Vec<VersionResponse>,
    pub total: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntryResponse {
    pub id: i32,
    /// One of: `Created`, `Updated`.
    #[schema(example = "Created")]
    pub action: String,
    #[schema(example = "admin")]
    pub performed_by: String,
    pub timestamp: DateTime<Utc>,
}

impl From<audit_trail::Model> for AuditEntryResponse {
    fn from(model: audit_trail::Model) -> Self {
        Self {
            id: model.id,
            action: model.action,
            performed_by: model.performed_by,
            timestamp: model.timestamp,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AuditListResponse {
    pub entries: Vec<AuditEntryResponse>,
    pub total: u64,
}

/// Query string for looking a document up by name.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct DocumentLookupQuery {
    /// Exact document name.
    pub name: String,
}
