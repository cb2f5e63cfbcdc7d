use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use crate::auth::{ANONYMOUS, CredentialStore, Credentials};
use crate::error::AppError;
use crate::state::AppState;

/// Principal extracted from the `Authorization: Basic <credentials>` header.
///
/// Add this as a handler parameter to require authentication. When
/// authentication is disabled in the configuration every request is
/// accepted as `anonymous`.
pub struct AuthUser {
    pub username: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(store) = state.credentials.as_ref() else {
            return Ok(AuthUser {
                username: ANONYMOUS.to_string(),
            });
        };

        let TypedHeader(Authorization(basic)) =
            TypedHeader::<Authorization<Basic>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    if e.is_missing() {
                        AppError::CredentialsMissing
                    } else {
                        AppError::InvalidCredentials
                    }
                })?;

        let credentials = Credentials {
            username: basic.username().to_string(),
            password: basic.password().to_string(),
        };

        // Password hashing is CPU-bound; keep it off the async workers.
        let store: Arc<dyn CredentialStore> = Arc::clone(store);
        let principal = tokio::task::spawn_blocking(move || store.authenticate(&credentials))
            .await
            .map_err(|e| AppError::Internal(format!("Credential check panicked: {e}")))??;

        Ok(AuthUser {
            username: principal.username,
        })
    }
}
