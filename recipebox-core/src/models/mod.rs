mod comment;
mod recipe;
mod user;

pub use comment::{Comment, NewComment};
pub use recipe::{NewRecipe, Recipe};
pub use user::UserProfile;

use chrono::{DateTime, Utc};

use crate::error::ModelError;
use crate::store::Document;

/// Reads a required string field.
pub(crate) fn required_str(doc: &Document, field: &'static str) -> Result<String, ModelError> {
    match doc.get(field) {
        None => Err(ModelError::MissingField {
            id: doc.id.clone(),
            field,
        }),
        Some(value) => value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ModelError::WrongType {
                id: doc.id.clone(),
                field,
            }),
    }
}

/// Reads a required timestamp field.
pub(crate) fn required_timestamp(
    doc: &Document,
    field: &'static str,
) -> Result<DateTime<Utc>, ModelError> {
    match doc.get(field) {
        None => Err(ModelError::MissingField {
            id: doc.id.clone(),
            field,
        }),
        Some(value) => value.as_timestamp().ok_or_else(|| ModelError::WrongType {
            id: doc.id.clone(),
            field,
        }),
    }
}
