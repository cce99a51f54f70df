use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{required_str, required_timestamp};
use crate::error::ModelError;
use crate::store::{Document, FieldValue, Fields};

pub(crate) const TEXT: &str = "text";
pub(crate) const USER_ID: &str = "userId";
pub(crate) const TIMESTAMP: &str = "timestamp";

/// A comment at `recipes/{recipe_id}/comments/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
}

impl Comment {
    pub fn from_document(doc: &Document) -> Result<Self, ModelError> {
        Ok(Self {
            id: doc.id.clone(),
            text: required_str(doc, TEXT)?,
            user_id: required_str(doc, USER_ID)?,
            timestamp: required_timestamp(doc, TIMESTAMP)?,
        })
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// A comment about to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub text: String,
    pub user_id: String,
}

impl NewComment {
    pub fn new(text: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            user_id: user_id.into(),
        }
    }

    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(TEXT.to_string(), self.text.as_str().into());
        fields.insert(USER_ID.to_string(), self.user_id.as_str().into());
        fields.insert(TIMESTAMP.to_string(), FieldValue::ServerTimestamp);
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_comment() {
        let fields: Fields = NewComment::new("tasty", "u1")
            .to_fields()
            .into_iter()
            .map(|(k, v)| (k, v.resolve(Utc::now())))
            .collect();
        let comment = Comment::from_document(&Document::new("c1", fields)).unwrap();

        assert_eq!(comment.id, "c1");
        assert_eq!(comment.text, "tasty");
        assert!(comment.is_owned_by("u1"));
        assert!(!comment.is_owned_by("u2"));
    }

    #[test]
    fn test_missing_text_is_error() {
        let mut fields = Fields::new();
        fields.insert(USER_ID.to_string(), "u1".into());
        let result = Comment::from_document(&Document::new("c1", fields));
        assert!(matches!(
            result,
            Err(ModelError::MissingField { field: "text", .. })
        ));
    }
}
