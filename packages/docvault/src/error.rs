use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

use crate::auth::AuthError;
use crate::ingest::IngestError;

/// Body of the 400 returned for a zero-length upload.
pub const EMPTY_FILE_MESSAGE: &str = "File is empty. Please upload a valid document.";

/// Prefix of every plain-text upload failure.
pub const UPLOAD_FAILED_PREFIX: &str = "An error occurred while uploading the document: ";

const BASIC_CHALLENGE: &str = "Basic realm=\"docvault\"";

/// Structured error response returned by the JSON endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `CREDENTIALS_MISSING`,
    /// `INVALID_CREDENTIALS`, `NOT_FOUND`, `INTERNAL_ERROR`.
    #[schema(example = "NOT_FOUND")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Document not found")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    CredentialsMissing,
    InvalidCredentials,
    NotFound(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::CredentialsMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "CREDENTIALS_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_CREDENTIALS",
                    message: "Invalid username or password".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let challenge = matches!(
            self,
            AppError::CredentialsMissing | AppError::InvalidCredentials
        );

        let (status, body) = self.status_and_body();

        if challenge {
            (
                status,
                [(header::WWW_AUTHENTICATE, BASIC_CHALLENGE)],
                Json(body),
            )
                .into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::Internal(detail) => AppError::Internal(detail),
        }
    }
}

/// Failure of an upload request, rendered as a plain-text body.
#[derive(Debug)]
pub enum UploadError {
    /// The file part carried zero bytes.
    EmptyFile,
    /// A required multipart part was absent.
    MissingPart(&'static str),
    /// The multipart body itself could not be read.
    Multipart { status: StatusCode, message: String },
    Ingest(IngestError),
}

impl UploadError {
    fn status_and_text(self) -> (StatusCode, String) {
        match self {
            UploadError::EmptyFile => (StatusCode::BAD_REQUEST, EMPTY_FILE_MESSAGE.to_string()),
            UploadError::MissingPart(name) => (
                StatusCode::BAD_REQUEST,
                format!("Required part '{name}' is not present."),
            ),
            UploadError::Multipart { status, message } => (status, message),
            UploadError::Ingest(err) => {
                let status = match &err {
                    IngestError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    IngestError::NotFound(_) => StatusCode::NOT_FOUND,
                    IngestError::Storage(StorageError::SizeLimitExceeded { .. }) => {
                        StatusCode::PAYLOAD_TOO_LARGE
                    }
                    IngestError::Storage(_) | IngestError::Persistence(_) => {
                        tracing::error!(error = ?err, "Upload failed");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, format!("{UPLOAD_FAILED_PREFIX}{err}"))
            }
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        self.status_and_text().into_response()
    }
}

impl From<IngestError> for UploadError {
    fn from(err: IngestError) -> Self {
        UploadError::Ingest(err)
    }
}
