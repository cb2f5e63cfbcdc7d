use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::{instrument, warn};

use crate::entity::document;
use crate::error::{AppError, ErrorBody, UploadError};
use crate::extractors::auth::AuthUser;
use crate::models::document::*;
use crate::repository::{AuditRepository, DocumentRepository, VersionRepository};
use crate::state::AppState;

/// Room for multipart boundaries and the owner field on top of the blob itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Body limit for upload routes, slightly above the blob size limit so an
/// oversized file is reported by the blob store rather than cut off mid-read.
pub fn upload_body_limit(max_blob_size: u64) -> DefaultBodyLimit {
    let max = usize::try_from(max_blob_size).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(max.saturating_add(MULTIPART_OVERHEAD))
}

struct UploadedFile {
    file_name: Option<String>,
    data: Bytes,
}

#[derive(Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    owner: Option<String>,
}

fn multipart_error(e: MultipartError) -> UploadError {
    UploadError::Multipart {
        status: e.status(),
        message: e.body_text(),
    }
}

/// Collect the `file` and `owner` parts. Unknown parts are ignored.
async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, UploadError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().map(|s| s.to_string());
                let data = field.bytes().await.map_err(multipart_error)?;
                form.file = Some(UploadedFile { file_name, data });
            }
            Some("owner") => {
                form.owner = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    Ok(form)
}

fn non_empty(file: Option<UploadedFile>) -> Result<UploadedFile, UploadError> {
    let file = file.ok_or(UploadError::MissingPart("file"))?;
    if file.data.is_empty() {
        warn!("Rejected empty upload");
        return Err(UploadError::EmptyFile);
    }
    Ok(file)
}

async fn find_document(state: &AppState, id: i32) -> Result<document::Model, AppError> {
    DocumentRepository::new(&state.db)
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".into()))
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Documents",
    operation_id = "uploadDocument",
    summary = "Upload a new document",
    description = "Stores the `file` part under its original filename and records a document \
        owned by the `owner` field, at version 1. Uploading a name that already exists creates \
        a new document and replaces the stored file. Errors are returned as plain text.",
    request_body(content_type = "multipart/form-data", description = "`file` part and `owner` field"),
    responses(
        (status = 201, description = "Document created", body = DocumentResponse),
        (status = 400, description = "Empty file, missing part or invalid filename", body = String, content_type = "text/plain"),
        (status = 401, description = "Unauthorized (CREDENTIALS_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 413, description = "File exceeds the configured size limit", body = String, content_type = "text/plain"),
        (status = 500, description = "Storage or database failure", body = String, content_type = "text/plain"),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user = %auth_user.username))]
pub async fn upload_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, UploadError> {
    let form = read_upload_form(multipart).await?;
    let file = non_empty(form.file)?;
    let owner = form.owner.ok_or(UploadError::MissingPart("owner"))?;

    let ingested = state
        .ingestion()
        .ingest(
            &file.data,
            file.file_name.as_deref(),
            &owner,
            &auth_user.username,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DocumentResponse::new(
            ingested.document,
            Some(ingested.version),
        )),
    ))
}

#[utoipa::path(
    post,
    path = "/{id}/versions",
    tag = "Documents",
    operation_id = "uploadRevision",
    summary = "Upload a new version of a document",
    description = "Stores the `file` part as the next version of an existing document. \
        Earlier versions keep their content. Errors are returned as plain text.",
    params(("id" = i32, Path, description = "Document ID")),
    request_body(content_type = "multipart/form-data", description = "`file` part"),
    responses(
        (status = 201, description = "Version created", body = DocumentResponse),
        (status = 400, description = "Empty file or missing part", body = String, content_type = "text/plain"),
        (status = 401, description = "Unauthorized (CREDENTIALS_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 404, description = "Document not found", body = String, content_type = "text/plain"),
        (status = 413, description = "File exceeds the configured size limit", body = String, content_type = "text/plain"),
        (status = 500, description = "Storage or database failure", body = String, content_type = "text/plain"),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user = %auth_user.username))]
pub async fn upload_revision(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<impl IntoResponse, UploadError> {
    let form = read_upload_form(multipart).await?;
    let file = non_empty(form.file)?;

    let ingested = state
        .ingestion()
        .ingest_revision(id, &file.data, &auth_user.username)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DocumentResponse::new(
            ingested.document,
            Some(ingested.version),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Documents",
    operation_id = "getDocument",
    summary = "Get a document",
    description = "Returns document metadata together with its latest version.",
    params(("id" = i32, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document found", body = DocumentResponse),
        (status = 401, description = "Unauthorized (CREDENTIALS_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 404, description = "Document not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_document(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DocumentResponse>, AppError> {
    let document = find_document(&state, id).await?;
    let latest = VersionRepository::new(&state.db).latest(id).await?;
    Ok(Json(DocumentResponse::new(document, latest)))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Documents",
    operation_id = "findDocumentByName",
    summary = "Look a document up by name",
    description = "Exact-match lookup. When several documents share the name the most \
        recently created one is returned.",
    params(DocumentLookupQuery),
    responses(
        (status = 200, description = "Document found", body = DocumentResponse),
        (status = 400, description = "Blank name (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (CREDENTIALS_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 404, description = "No document with that name (NOT_FOUND)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _auth_user, query), fields(name = %query.name))]
pub async fn find_document_by_name(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<DocumentLookupQuery>,
) -> Result<Json<DocumentResponse>, AppError> {
    if query.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Query parameter 'name' must not be empty".into(),
        ));
    }

    let document = DocumentRepository::new(&state.db)
        .find_by_name(&query.name)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".into()))?;
    let latest = VersionRepository::new(&state.db).latest(document.id).await?;
    Ok(Json(DocumentResponse::new(document, latest)))
}

#[utoipa::path(
    get,
    path = "/{id}/versions",
    tag = "Documents",
    operation_id = "listVersions",
    summary = "List document versions",
    description = "Returns every version of the document, highest version number first.",
    params(("id" = i32, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Version list", body = VersionListResponse),
        (status = 401, description = "Unauthorized (CREDENTIALS_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 404, description = "Document not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_versions(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<VersionListResponse>, AppError> {
    find_document(&state, id).await?;

    let versions: Vec<VersionResponse> = VersionRepository::new(&state.db)
        .find_by_document_id_order_by_version_desc(id)
        .await?
        .into_iter()
        .map(VersionResponse::from)
        .collect();

    Ok(Json(VersionListResponse {
        total: versions.len() as u64,
        versions,
    }))
}

#[utoipa::path(
    get,
    path = "/{id}/audit",
    tag = "Documents",
    operation_id = "listAuditTrail",
    summary = "List audit entries of a document",
    description = "Returns the document's audit trail in the order the actions happened.",
    params(("id" = i32, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Audit trail", body = AuditListResponse),
        (status = 401, description = "Unauthorized (CREDENTIALS_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 404, description = "Document not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_audit_trail(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AuditListResponse>, AppError> {
    find_document(&state, id).await?;

    let entries: Vec<AuditEntryResponse> = AuditRepository::new(&state.db)
        .find_by_document_id(id)
        .await?
        .into_iter()
        .map(AuditEntryResponse::from)
        .collect();

    Ok(Json(AuditListResponse {
        total: entries.len() as u64,
        entries,
    }))
}
