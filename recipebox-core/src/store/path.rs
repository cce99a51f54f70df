//! Typed collection and document paths.
//!
//! A path alternates collection and document segments:
//! `recipes` is a collection, `recipes/{id}` a document and
//! `recipes/{id}/comments` a nested collection.

use std::fmt;

use rand::distr::{Alphanumeric, SampleString};

use super::StoreError;

/// Collection holding one profile document per identity.
pub const USERS: &str = "users";
/// Collection holding every recipe.
pub const RECIPES: &str = "recipes";
/// Sub-collection of a recipe holding its comments.
pub const COMMENTS: &str = "comments";

/// Length of store-assigned document ids.
const GENERATED_ID_LEN: usize = 20;

/// Path to a collection (odd number of segments).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Parses a slash-separated collection path.
    pub fn parse(path: &str) -> Result<Self, StoreError> {
        let segments = split_segments(path)?;
        if segments.len() % 2 == 0 {
            return Err(invalid(path, "collection paths need an odd number of segments"));
        }
        Ok(Self(segments.join("/")))
    }

    /// The `users` collection.
    pub fn users() -> Self {
        Self(USERS.to_string())
    }

    /// The `recipes` collection.
    pub fn recipes() -> Self {
        Self(RECIPES.to_string())
    }

    /// The `recipes/{recipe_id}/comments` collection.
    pub fn comments(recipe_id: &str) -> Result<Self, StoreError> {
        validate_segment(recipe_id, recipe_id)?;
        Ok(Self(format!("{}/{}/{}", RECIPES, recipe_id, COMMENTS)))
    }

    /// Path of the document `id` inside this collection.
    pub fn doc(&self, id: &str) -> Result<DocumentPath, StoreError> {
        DocumentPath::new(self.clone(), id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Path to a single document: a collection plus a document id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    collection: CollectionPath,
    id: String,
}

impl DocumentPath {
    pub fn new(collection: CollectionPath, id: &str) -> Result<Self, StoreError> {
        validate_segment(id, id)?;
        Ok(Self {
            collection,
            id: id.to_string(),
        })
    }

    /// Parses a slash-separated document path (even number of segments).
    pub fn parse(path: &str) -> Result<Self, StoreError> {
        let mut segments = split_segments(path)?;
        if segments.len() % 2 != 0 {
            return Err(invalid(path, "document paths need an even number of segments"));
        }
        let id = segments.pop().unwrap_or_default().to_string();
        Ok(Self {
            collection: CollectionPath(segments.join("/")),
            id,
        })
    }

    /// `users/{user_id}`
    pub fn user(user_id: &str) -> Result<Self, StoreError> {
        CollectionPath::users().doc(user_id)
    }

    /// `recipes/{recipe_id}`
    pub fn recipe(recipe_id: &str) -> Result<Self, StoreError> {
        CollectionPath::recipes().doc(recipe_id)
    }

    /// `recipes/{recipe_id}/comments/{comment_id}`
    pub fn comment(recipe_id: &str, comment_id: &str) -> Result<Self, StoreError> {
        CollectionPath::comments(recipe_id)?.doc(comment_id)
    }

    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Generates a random 20-character alphanumeric document id.
pub fn generate_document_id() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), GENERATED_ID_LEN)
}

fn split_segments(path: &str) -> Result<Vec<&str>, StoreError> {
    if path.is_empty() {
        return Err(invalid(path, "path is empty"));
    }
    let segments: Vec<&str> = path.split('/').collect();
    for segment in &segments {
        validate_segment(segment, path)?;
    }
    Ok(segments)
}

fn validate_segment(segment: &str, path: &str) -> Result<(), StoreError> {
    if segment.is_empty() {
        return Err(invalid(path, "empty segment"));
    }
    if segment.contains('/') {
        return Err(invalid(path, "ids cannot contain '/'"));
    }
    if segment == "." || segment == ".." {
        return Err(invalid(path, "'.' and '..' are reserved"));
    }
    Ok(())
}

fn invalid(path: &str, reason: &'static str) -> StoreError {
    StoreError::InvalidPath {
        path: path.to_string(),
        reason,
    }
}
