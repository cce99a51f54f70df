//! Auth boundary: user accounts keyed by email.

mod local;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use local::LocalAuth;

/// Minimum password length accepted when creating an identity.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// An authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable unique id, also the key of the user's profile document.
    pub uid: String,
    pub email: String,
}

/// Errors reported by the auth boundary.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed email, unknown account, or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("an account already exists for this email")]
    DuplicateAccount,

    #[error("password too weak: {0}")]
    WeakCredential(String),

    /// The auth service could not be reached or failed to persist.
    #[error("auth service unavailable: {0}")]
    Network(String),
}

/// Client surface of the auth service.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Registers a new account and returns its identity.
    async fn create_identity(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Checks credentials and returns the matching identity.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, AuthError>;
}

/// Normalizes an email for lookup: trimmed and lower-cased.
pub(crate) fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::InvalidCredentials);
    }
    Ok(email)
}

pub(crate) fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakCredential(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Alice@Example.COM ").unwrap(),
            "alice@example.com"
        );
        assert!(matches!(
            normalize_email("alice"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(normalize_email("   ").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(matches!(
            validate_password("12345"),
            Err(AuthError::WeakCredential(_))
        ));
    }
}
