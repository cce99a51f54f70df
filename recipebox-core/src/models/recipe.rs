use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{required_str, required_timestamp};
use crate::error::ModelError;
use crate::store::{Document, FieldValue, Fields};

pub(crate) const TITLE: &str = "title";
pub(crate) const INGREDIENTS: &str = "ingredients";
pub(crate) const INSTRUCTIONS: &str = "instructions";
pub(crate) const USER_ID: &str = "userId";
pub(crate) const IMAGE_URL: &str = "imageURL";
pub(crate) const TIMESTAMP: &str = "timestamp";

/// A recipe document at `recipes/{id}`. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub image_url: Option<String>,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
}

impl Recipe {
    /// Decodes a recipe. An empty `imageURL` reads as no image.
    pub fn from_document(doc: &Document) -> Result<Self, ModelError> {
        let image_url = match doc.get(IMAGE_URL) {
            None | Some(FieldValue::Null) => None,
            Some(FieldValue::String(url)) if url.is_empty() => None,
            Some(FieldValue::String(url)) => Some(url.clone()),
            Some(_) => {
                return Err(ModelError::WrongType {
                    id: doc.id.clone(),
                    field: IMAGE_URL,
                })
            }
        };

        Ok(Self {
            id: doc.id.clone(),
            title: required_str(doc, TITLE)?,
            ingredients: required_str(doc, INGREDIENTS)?,
            instructions: required_str(doc, INSTRUCTIONS)?,
            image_url,
            user_id: required_str(doc, USER_ID)?,
            timestamp: required_timestamp(doc, TIMESTAMP)?,
        })
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count()))?;

        if let Some(url) = &self.image_url {
            writeln!(f, "Image: {}", url)?;
        }

        writeln!(f, "\nIngredients:")?;
        for line in self.ingredients.lines().filter(|l| !l.trim().is_empty()) {
            writeln!(f, "  - {}", line.trim())?;
        }

        writeln!(f, "\nInstructions:")?;
        write!(f, "{}", self.instructions)
    }
}

/// A recipe about to be created. The store stamps its timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub user_id: String,
    pub image_url: Option<String>,
}

impl NewRecipe {
    pub fn new(
        title: impl Into<String>,
        ingredients: impl Into<String>,
        instructions: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            ingredients: ingredients.into(),
            instructions: instructions.into(),
            user_id: user_id.into(),
            image_url: None,
        }
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Absent image URLs are stored as the empty string.
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(TITLE.to_string(), self.title.as_str().into());
        fields.insert(INGREDIENTS.to_string(), self.ingredients.as_str().into());
        fields.insert(INSTRUCTIONS.to_string(), self.instructions.as_str().into());
        fields.insert(USER_ID.to_string(), self.user_id.as_str().into());
        fields.insert(
            IMAGE_URL.to_string(),
            self.image_url.as_deref().unwrap_or_default().into(),
        );
        fields.insert(TIMESTAMP.to_string(), FieldValue::ServerTimestamp);
        fields
    }
}
