//! Store wrapper for unit tests: counts calls and can refuse writes.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::store::{
    CollectionPath, Document, DocumentPath, DocumentStore, FieldValue, Fields, LocalStore, Query,
    StoreError, Subscription,
};

#[derive(Clone)]
pub(crate) struct FlakyStore {
    inner: LocalStore,
    queries: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    pub(crate) fn new(inner: LocalStore) -> Self {
        Self {
            inner,
            queries: Arc::new(AtomicUsize::new(0)),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of one-shot queries issued so far.
    pub(crate) fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError> {
        self.inner.get_document(path).await
    }

    async fn set_document(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.set_document(path, fields).await
    }

    async fn add_document(
        &self,
        collection: &CollectionPath,
        fields: Fields,
    ) -> Result<String, StoreError> {
        self.check_write()?;
        self.inner.add_document(collection, fields).await
    }

    async fn update_fields(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.update_fields(path, fields).await
    }

    async fn delete_document(&self, path: &DocumentPath) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.delete_document(path).await
    }

    async fn add_to_set(
        &self,
        path: &DocumentPath,
        field: &str,
        value: FieldValue,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.add_to_set(path, field, value).await
    }

    async fn remove_from_set(
        &self,
        path: &DocumentPath,
        field: &str,
        value: FieldValue,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.remove_from_set(path, field, value).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.query(query).await
    }

    async fn subscribe_document(
        &self,
        path: &DocumentPath,
    ) -> Result<Subscription<Option<Document>>, StoreError> {
        self.inner.subscribe_document(path).await
    }

    async fn subscribe_query(
        &self,
        query: &Query,
    ) -> Result<Subscription<Vec<Document>>, StoreError> {
        self.inner.subscribe_query(query).await
    }
}
