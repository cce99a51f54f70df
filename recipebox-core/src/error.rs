//! Application error taxonomy.

use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;

/// A stored document that does not decode into a model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("document '{id}' is missing field '{field}'")]
    MissingField { id: String, field: &'static str },

    #[error("field '{field}' of document '{id}' has the wrong type")]
    WrongType { id: String, field: &'static str },
}

/// Errors surfaced by the session, repository and screens.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// Input rejected before any boundary call.
    #[error("{0}")]
    Validation(String),

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The identity was created but its profile document was not written.
    #[error("account created but profile for {user_id} could not be saved: {source}")]
    ProfileWrite {
        user_id: String,
        #[source]
        source: StoreError,
    },

    #[error("not found: {0}")]
    NotFound(String),

    /// A live subscription failed.
    #[error("sync failed: {0}")]
    Sync(StoreError),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl RecipeError {
    pub fn validation(message: impl Into<String>) -> Self {
        RecipeError::Validation(message.into())
    }
}

impl From<StoreError> for RecipeError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => RecipeError::NotFound(what),
            other => RecipeError::Store(other),
        }
    }
}
