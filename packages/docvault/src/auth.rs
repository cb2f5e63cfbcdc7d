//! Credential checking behind a capability interface.
//!
//! Handlers never see passwords: the [`AuthUser`](crate::extractors::auth::AuthUser)
//! extractor hands the request's credentials to a [`CredentialStore`] and only
//! the resulting [`Principal`] flows further.

use crate::utils::hash;

/// Name of the principal used when authentication is disabled.
pub const ANONYMOUS: &str = "anonymous";

/// Username and password as presented by a client.
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// An authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("credential check failed: {0}")]
    Internal(String),
}

pub trait CredentialStore: Send + Sync {
    fn authenticate(&self, credentials: &Credentials) -> Result<Principal, AuthError>;
}

/// A single account held in memory. The password is kept only as an Argon2 hash.
pub struct InMemoryCredentialStore {
    username: String,
    password_hash: String,
}

impl InMemoryCredentialStore {
    pub fn new(username: &str, password: &str) -> Result<Self, AuthError> {
        let password_hash =
            hash::hash_password(password).map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok(Self {
            username: username.to_string(),
            password_hash,
        })
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn authenticate(&self, credentials: &Credentials) -> Result<Principal, AuthError> {
        // Verify before comparing usernames so an unknown user costs the same as a bad password.
        let password_ok = hash::verify_password(&credentials.password, &self.password_hash)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if password_ok && credentials.username == self.username {
            Ok(Principal {
                username: self.username.clone(),
            })
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}
