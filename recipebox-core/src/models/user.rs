use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{required_str, required_timestamp};
use crate::error::ModelError;
use crate::store::{Document, FieldValue, Fields};

pub(crate) const EMAIL: &str = "email";
pub(crate) const USERNAME: &str = "username";
pub(crate) const USER_ID: &str = "userId";
pub(crate) const CREATED_AT: &str = "createdAt";
pub(crate) const FAVORITES: &str = "favorites";

/// Profile document stored at `users/{user_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub favorites: BTreeSet<String>,
}

impl UserProfile {
    /// Fields for a freshly registered user: no favorites, server-stamped.
    pub fn new_fields(user_id: &str, email: &str, username: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert(EMAIL.to_string(), email.into());
        fields.insert(USERNAME.to_string(), username.into());
        fields.insert(USER_ID.to_string(), user_id.into());
        fields.insert(CREATED_AT.to_string(), FieldValue::ServerTimestamp);
        fields.insert(FAVORITES.to_string(), FieldValue::Array(Vec::new()));
        fields
    }

    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(EMAIL.to_string(), self.email.as_str().into());
        fields.insert(USERNAME.to_string(), self.username.as_str().into());
        fields.insert(USER_ID.to_string(), self.user_id.as_str().into());
        fields.insert(CREATED_AT.to_string(), self.created_at.into());
        fields.insert(
            FAVORITES.to_string(),
            FieldValue::Array(self.favorites.iter().map(|id| id.as_str().into()).collect()),
        );
        fields
    }

    /// Decodes a profile. A missing `favorites` field reads as the empty set.
    pub fn from_document(doc: &Document) -> Result<Self, ModelError> {
        let favorites = match doc.get(FAVORITES) {
            None => BTreeSet::new(),
            Some(FieldValue::Array(_)) => doc
                .get_string_array(FAVORITES)
                .unwrap_or_default()
                .into_iter()
                .collect(),
            Some(_) => {
                return Err(ModelError::WrongType {
                    id: doc.id.clone(),
                    field: FAVORITES,
                })
            }
        };

        Ok(Self {
            user_id: doc.id.clone(),
            email: required_str(doc, EMAIL)?,
            username: required_str(doc, USERNAME)?,
            created_at: required_timestamp(doc, CREATED_AT)?,
            favorites,
        })
    }

    pub fn is_favorite(&self, recipe_id: &str) -> bool {
        self.favorites.contains(recipe_id)
    }
}
