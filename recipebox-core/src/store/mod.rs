//! Document store boundary.
//!
//! A document database of collections and documents with point reads and
//! writes, atomic set-membership updates, ordered queries, and live
//! subscriptions that push a full snapshot on every change.

mod codec;
mod error;
mod hub;
mod local;
mod path;
mod query;
mod subscription;
mod value;

use async_trait::async_trait;

pub use error::StoreError;
pub use hub::{ChangeEvent, ChangeHub};
pub use local::LocalStore;
pub use path::{generate_document_id, CollectionPath, DocumentPath, COMMENTS, RECIPES, USERS};
pub use query::{Direction, Filter, Query, MAX_IN_VALUES};
pub use subscription::{Push, Subscription};
pub use value::{Document, FieldValue, Fields};

/// Client surface of the document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads one document. A missing document is `Ok(None)`.
    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError>;

    /// Creates or overwrites a document.
    async fn set_document(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError>;

    /// Creates a document with a store-assigned id and returns the id.
    async fn add_document(
        &self,
        collection: &CollectionPath,
        fields: Fields,
    ) -> Result<String, StoreError>;

    /// Merges fields into an existing document.
    ///
    /// Fails with [`StoreError::NotFound`] if the document does not exist.
    async fn update_fields(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError>;

    /// Deletes a document. Deleting a missing document succeeds.
    async fn delete_document(&self, path: &DocumentPath) -> Result<(), StoreError>;

    /// Atomically adds `value` to an array field unless already present.
    async fn add_to_set(
        &self,
        path: &DocumentPath,
        field: &str,
        value: FieldValue,
    ) -> Result<(), StoreError>;

    /// Atomically removes every occurrence of `value` from an array field.
    async fn remove_from_set(
        &self,
        path: &DocumentPath,
        field: &str,
        value: FieldValue,
    ) -> Result<(), StoreError>;

    /// Runs a query once.
    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Watches one document. Pushes `None` while it does not exist.
    async fn subscribe_document(
        &self,
        path: &DocumentPath,
    ) -> Result<Subscription<Option<Document>>, StoreError>;

    /// Watches a query's result set.
    async fn subscribe_query(&self, query: &Query)
        -> Result<Subscription<Vec<Document>>, StoreError>;
}
