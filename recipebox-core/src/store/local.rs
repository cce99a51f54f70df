//! In-process document store backed by a single Automerge document.
//!
//! Document layout:
//! ```text
//! ROOT
//! ├── "recipes/k3J9x..."             (map: the recipe's fields)
//! ├── "recipes/k3J9x.../comments/Qp2" (map: the comment's fields)
//! └── "users/u1"                     (map: the profile's fields)
//! ```
//!
//! Each document sits under its full path at the root, so writers that never
//! saw each other's documents can still be merged without conflicts.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use async_trait::async_trait;
use automerge::transaction::Transactable;
use automerge::{AutoCommit, ObjId, ObjType, ReadDoc, Value, ROOT};
use chrono::{DateTime, Utc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::codec::{insert_item, read_fields, read_list, write_fields};
use super::hub::ChangeHub;
use super::subscription::{self, Subscription};
use super::{
    generate_document_id, CollectionPath, Document, DocumentPath, DocumentStore, FieldValue,
    Fields, Query, StoreError,
};
use crate::persist::{DocType, DocumentStorage, FileStamp};

/// How often a store with live subscriptions checks its file for outside writes.
pub const DISK_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Local implementation of [`DocumentStore`].
///
/// Every operation takes the document lock for its whole duration, so set
/// updates are atomic. Change notifications go out after the lock is released.
/// A store opened on disk merges in writes from other processes sharing the
/// data directory, both before each save and while subscriptions are live.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<State>,
    hub: ChangeHub,
    storage: Option<DocumentStorage>,
    watching: AtomicBool,
}

struct State {
    doc: AutoCommit,
    /// Last timestamp handed out, in milliseconds since the epoch.
    last_ms: i64,
    /// File stamp as of the last merge from disk.
    seen: Option<FileStamp>,
}

impl State {
    /// Returns the store clock's next reading, strictly after the previous one.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ms = now.timestamp_millis().max(self.last_ms + 1);
        self.last_ms = ms;
        DateTime::from_timestamp_millis(ms).unwrap_or(now)
    }

    fn resolve(&mut self, fields: Fields) -> Fields {
        let now = self.next_timestamp();
        fields
            .into_iter()
            .map(|(name, value)| (name, value.resolve(now)))
            .collect()
    }
}

impl LocalStore {
    /// Creates a store that never touches disk.
    pub fn in_memory() -> Self {
        Self::with_parts(AutoCommit::new(), None, None)
    }

    /// Opens the store persisted in `data_dir`, creating it on first write.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let storage = DocumentStorage::new(data_dir);
        let seen = storage.stamp(DocType::Store)?;
        let doc = storage.read_or_default(DocType::Store)?;
        info!(path = %storage.file(DocType::Store).display(), "opened document store");
        Ok(Self::with_parts(doc, seen, Some(storage)))
    }

    fn with_parts(
        doc: AutoCommit,
        seen: Option<FileStamp>,
        storage: Option<DocumentStorage>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    doc,
                    last_ms: 0,
                    seen,
                }),
                hub: ChangeHub::new(),
                storage,
                watching: AtomicBool::new(false),
            }),
        }
    }

    /// Runs a mutation under the lock, persists, then notifies subscribers.
    ///
    /// If the mutation or the save fails the document is restored, so the
    /// failed change is never visible.
    async fn mutate<R>(
        &self,
        collection: &CollectionPath,
        f: impl FnOnce(&mut State) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let (result, merged) = {
            let mut state = self.inner.lock()?;
            let snapshot = state.doc.clone();
            let outcome = f(&mut *state).and_then(|result| {
                let merged = match &self.inner.storage {
                    Some(storage) => storage.merge_and_write(DocType::Store, &mut state.doc)?,
                    None => false,
                };
                Ok((result, merged))
            });
            match outcome {
                Ok(done) => done,
                Err(e) => {
                    state.doc = snapshot;
                    return Err(e);
                }
            }
        };

        if merged {
            self.inner.hub.notify_all().await;
        } else {
            self.inner.hub.notify(collection).await;
        }
        Ok(result)
    }

    /// Starts polling the file for outside writes, once per store.
    ///
    /// The poller stops when the last handle to the store goes away.
    fn watch_disk(&self) {
        if self.inner.storage.is_none() || self.inner.watching.swap(true, Ordering::SeqCst) {
            return;
        }
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        debug!(interval_ms = DISK_POLL_INTERVAL.as_millis(), "watching store file");

        tokio::spawn(async move {
            let mut ticker = interval(DISK_POLL_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                match inner.refresh_from_disk() {
                    Ok(true) => inner.hub.notify_all().await,
                    Ok(false) => {}
                    Err(e) => warn!(error = %e, "error checking store file"),
                }
            }
            debug!("store file watcher stopped");
        });
    }
}

impl Inner {
    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    /// Merges the file if it changed since the last look. Returns whether the
    /// document gained changes.
    fn refresh_from_disk(&self) -> Result<bool, StoreError> {
        let Some(storage) = &self.storage else {
            return Ok(false);
        };
        let stamp = storage.stamp(DocType::Store)?;
        let mut state = self.lock()?;
        if stamp == state.seen {
            return Ok(false);
        }
        state.seen = stamp;
        Ok(storage.merge_from_disk(DocType::Store, &mut state.doc)?)
    }

    fn read_document(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError> {
        let state = self.lock()?;
        let Some(obj) = find_document(&state.doc, path)? else {
            return Ok(None);
        };
        let fields = read_fields(&state.doc, &obj)?;
        Ok(Some(Document::new(path.id(), fields)))
    }

    fn read_query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        query.validate()?;
        let state = self.lock()?;

        let mut docs = Vec::new();
        for key in state.doc.keys(ROOT) {
            let Some(id) = member_id(query.collection(), &key) else {
                continue;
            };
            if let Some(obj) = find_map(&state.doc, &ROOT, &key)? {
                docs.push(Document::new(id, read_fields(&state.doc, &obj)?));
            }
        }
        Ok(query.apply(docs))
    }
}

/// The document id when `key` names a document directly inside `collection`.
fn member_id<'a>(collection: &CollectionPath, key: &'a str) -> Option<&'a str> {
    let id = key
        .strip_prefix(collection.as_str())?
        .strip_prefix('/')?;
    (!id.is_empty() && !id.contains('/')).then_some(id)
}

/// Looks up a nested map object by key.
fn find_map(doc: &AutoCommit, parent: &ObjId, key: &str) -> Result<Option<ObjId>, StoreError> {
    match doc.get(parent, key)? {
        Some((Value::Object(ObjType::Map), id)) => Ok(Some(id)),
        _ => Ok(None),
    }
}

fn find_document(doc: &AutoCommit, path: &DocumentPath) -> Result<Option<ObjId>, StoreError> {
    find_map(doc, &ROOT, &path.to_string())
}

fn require_document(doc: &AutoCommit, path: &DocumentPath) -> Result<ObjId, StoreError> {
    find_document(doc, path)?.ok_or_else(|| StoreError::NotFound(path.to_string()))
}

fn put_document(doc: &mut AutoCommit, path: &DocumentPath, fields: &Fields) -> Result<(), StoreError> {
    let obj = doc.put_object(ROOT, path.to_string(), ObjType::Map)?;
    write_fields(doc, &obj, fields)?;
    Ok(())
}

/// Returns the list object behind a set-valued field, if the field exists.
fn find_set(
    doc: &AutoCommit,
    obj: &ObjId,
    path: &DocumentPath,
    field: &str,
) -> Result<Option<ObjId>, StoreError> {
    match doc.get(obj, field)? {
        None => Ok(None),
        Some((Value::Object(ObjType::List), list)) => Ok(Some(list)),
        Some(_) => Err(StoreError::NotAnArray {
            path: path.to_string(),
            field: field.to_string(),
        }),
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError> {
        self.inner.read_document(path)
    }

    async fn set_document(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError> {
        self.mutate(path.collection(), |state| {
            let fields = state.resolve(fields);
            put_document(&mut state.doc, path, &fields)
        })
        .await?;
        debug!(path = %path, "document set");
        Ok(())
    }

    async fn add_document(
        &self,
        collection: &CollectionPath,
        fields: Fields,
    ) -> Result<String, StoreError> {
        let id = self
            .mutate(collection, |state| {
                let fields = state.resolve(fields);
                let mut id = generate_document_id();
                while find_document(&state.doc, &collection.doc(&id)?)?.is_some() {
                    id = generate_document_id();
                }
                put_document(&mut state.doc, &collection.doc(&id)?, &fields)?;
                Ok(id)
            })
            .await?;
        debug!(collection = %collection, id = %id, "document added");
        Ok(id)
    }

    async fn update_fields(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError> {
        self.mutate(path.collection(), |state| {
            let obj = require_document(&state.doc, path)?;
            let fields = state.resolve(fields);
            write_fields(&mut state.doc, &obj, &fields)?;
            Ok(())
        })
        .await?;
        debug!(path = %path, "document updated");
        Ok(())
    }

    async fn delete_document(&self, path: &DocumentPath) -> Result<(), StoreError> {
        self.mutate(path.collection(), |state| {
            let key = path.to_string();
            if state.doc.get(ROOT, key.as_str())?.is_some() {
                state.doc.delete(ROOT, key.as_str())?;
            }
            Ok(())
        })
        .await?;
        debug!(path = %path, "document deleted");
        Ok(())
    }

    async fn add_to_set(
        &self,
        path: &DocumentPath,
        field: &str,
        value: FieldValue,
    ) -> Result<(), StoreError> {
        self.mutate(path.collection(), |state| {
            let obj = require_document(&state.doc, path)?;
            let value = value.resolve(state.next_timestamp());
            let list = match find_set(&state.doc, &obj, path, field)? {
                Some(list) => list,
                None => state.doc.put_object(&obj, field, ObjType::List)?,
            };
            if !read_list(&state.doc, &list)?.contains(&value) {
                let end = state.doc.length(&list);
                insert_item(&mut state.doc, &list, end, &value)?;
            }
            Ok(())
        })
        .await?;
        debug!(path = %path, field, "set member added");
        Ok(())
    }

    async fn remove_from_set(
        &self,
        path: &DocumentPath,
        field: &str,
        value: FieldValue,
    ) -> Result<(), StoreError> {
        self.mutate(path.collection(), |state| {
            let obj = require_document(&state.doc, path)?;
            let Some(list) = find_set(&state.doc, &obj, path, field)? else {
                return Ok(());
            };
            let items = read_list(&state.doc, &list)?;
            for (index, item) in items.iter().enumerate().rev() {
                if *item == value {
                    state.doc.delete(&list, index)?;
                }
            }
            Ok(())
        })
        .await?;
        debug!(path = %path, field, "set member removed");
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.inner.read_query(query)
    }

    async fn subscribe_document(
        &self,
        path: &DocumentPath,
    ) -> Result<Subscription<Option<Document>>, StoreError> {
        let changes = self.inner.hub.subscribe(path.collection()).await;
        self.watch_disk();
        let inner = self.inner.clone();
        let path = path.clone();
        debug!(path = %path, "document subscription opened");
        Ok(subscription::spawn(changes, move || inner.read_document(&path)))
    }

    async fn subscribe_query(
        &self,
        query: &Query,
    ) -> Result<Subscription<Vec<Document>>, StoreError> {
        query.validate()?;
        let changes = self.inner.hub.subscribe(query.collection()).await;
        self.watch_disk();
        let inner = self.inner.clone();
        let query = query.clone();
        debug!(collection = %query.collection(), "query subscription opened");
        Ok(subscription::spawn(changes, move || inner.read_query(&query)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Direction, Filter, Push};
    use tempfile::TempDir;
    use tokio::time::timeout;

    fn fields(pairs: &[(&str, FieldValue)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = LocalStore::in_memory();
        let path = DocumentPath::user("u1").unwrap();

        store
            .set_document(&path, fields(&[("username", "alice".into())]))
            .await
            .unwrap();

        let doc = store.get_document(&path).await.unwrap().unwrap();
        assert_eq!(doc.id, "u1");
        assert_eq!(doc.get_str("username"), Some("alice"));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = LocalStore::in_memory();
        let path = DocumentPath::recipe("nope").unwrap();
        assert!(store.get_document(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = LocalStore::in_memory();
        let path = DocumentPath::user("u1").unwrap();
        store
            .set_document(&path, fields(&[("a", "1".into()), ("b", "2".into())]))
            .await
            .unwrap();
        store
            .set_document(&path, fields(&[("a", "3".into())]))
            .await
            .unwrap();

        let doc = store.get_document(&path).await.unwrap().unwrap();
        assert_eq!(doc.get_str("a"), Some("3"));
        assert!(doc.get("b").is_none());
    }

    #[tokio::test]
    async fn test_server_timestamps_strictly_increase() {
        let store = LocalStore::in_memory();
        let recipes = CollectionPath::recipes();

        let mut ids = Vec::new();
        for _ in 0..5 {
            let id = store
                .add_document(&recipes, fields(&[("timestamp", FieldValue::ServerTimestamp)]))
                .await
                .unwrap();
            ids.push(id);
        }

        let query = Query::new(recipes).order_by("timestamp", Direction::Descending);
        let docs = store.query(&query).await.unwrap();
        let ordered: Vec<String> = docs.iter().map(|d| d.id.clone()).collect();
        ids.reverse();
        assert_eq!(ordered, ids);

        let stamps: Vec<_> = docs.iter().map(|d| d.get_timestamp("timestamp").unwrap()).collect();
        assert!(stamps.windows(2).all(|w| w[0] > w[1]));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = LocalStore::in_memory();
        let path = DocumentPath::user("ghost").unwrap();
        let result = store.update_fields(&path, fields(&[("x", 1i64.into())])).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));

        let result = store.add_to_set(&path, "favorites", "r1".into()).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = LocalStore::in_memory();
        let path = DocumentPath::user("u1").unwrap();
        store
            .set_document(&path, fields(&[("a", "1".into())]))
            .await
            .unwrap();
        store
            .update_fields(&path, fields(&[("b", "2".into())]))
            .await
            .unwrap();

        let doc = store.get_document(&path).await.unwrap().unwrap();
        assert_eq!(doc.get_str("a"), Some("1"));
        assert_eq!(doc.get_str("b"), Some("2"));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = LocalStore::in_memory();
        let path = DocumentPath::recipe("r1").unwrap();
        store.delete_document(&path).await.unwrap();

        store
            .set_document(&path, fields(&[("title", "Soup".into())]))
            .await
            .unwrap();
        store.delete_document(&path).await.unwrap();
        store.delete_document(&path).await.unwrap();
        assert!(store.get_document(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_operations() {
        let store = LocalStore::in_memory();
        let path = DocumentPath::user("u1").unwrap();
        store
            .set_document(&path, fields(&[("favorites", FieldValue::Array(vec![]))]))
            .await
            .unwrap();

        store.add_to_set(&path, "favorites", "r1".into()).await.unwrap();
        store.add_to_set(&path, "favorites", "r1".into()).await.unwrap();
        store.add_to_set(&path, "favorites", "r2".into()).await.unwrap();

        let doc = store.get_document(&path).await.unwrap().unwrap();
        assert_eq!(
            doc.get_string_array("favorites"),
            Some(vec!["r1".to_string(), "r2".to_string()])
        );

        store.remove_from_set(&path, "favorites", "r1".into()).await.unwrap();
        store.remove_from_set(&path, "favorites", "r1".into()).await.unwrap();
        store.remove_from_set(&path, "missing", "r1".into()).await.unwrap();

        let doc = store.get_document(&path).await.unwrap().unwrap();
        assert_eq!(doc.get_string_array("favorites"), Some(vec!["r2".to_string()]));
    }

    #[tokio::test]
    async fn test_add_to_set_creates_missing_field() {
        let store = LocalStore::in_memory();
        let path = DocumentPath::user("u1").unwrap();
        store.set_document(&path, Fields::new()).await.unwrap();

        store.add_to_set(&path, "favorites", "r1".into()).await.unwrap();

        let doc = store.get_document(&path).await.unwrap().unwrap();
        assert_eq!(doc.get_string_array("favorites"), Some(vec!["r1".to_string()]));
    }

    #[tokio::test]
    async fn test_set_operation_on_scalar_field() {
        let store = LocalStore::in_memory();
        let path = DocumentPath::user("u1").unwrap();
        store
            .set_document(&path, fields(&[("favorites", "oops".into())]))
            .await
            .unwrap();

        let result = store.add_to_set(&path, "favorites", "r1".into()).await;
        assert!(matches!(result, Err(StoreError::NotAnArray { .. })));
    }

    #[tokio::test]
    async fn test_query_filters() {
        let store = LocalStore::in_memory();
        let recipes = CollectionPath::recipes();
        for id in ["a", "b", "c"] {
            store
                .set_document(&recipes.doc(id).unwrap(), fields(&[("title", id.into())]))
                .await
                .unwrap();
        }

        let query = Query::new(recipes.clone()).filter(Filter::IdIn(vec!["a".into(), "c".into()]));
        let docs = store.query(&query).await.unwrap();
        assert_eq!(docs.len(), 2);

        let too_many = (0..31).map(|i| i.to_string()).collect();
        let query = Query::new(recipes).filter(Filter::IdIn(too_many));
        assert!(matches!(
            store.query(&query).await,
            Err(StoreError::InvalidQuery(_))
        ));
    }

    #[tokio::test]
    async fn test_nested_collections_are_separate() {
        let store = LocalStore::in_memory();
        store
            .set_document(&DocumentPath::recipe("r1").unwrap(), Fields::new())
            .await
            .unwrap();
        store
            .add_document(
                &CollectionPath::comments("r1").unwrap(),
                fields(&[("text", "tasty".into())]),
            )
            .await
            .unwrap();

        let recipes = store.query(&Query::new(CollectionPath::recipes())).await.unwrap();
        assert_eq!(recipes.len(), 1);
        let comments = store
            .query(&Query::new(CollectionPath::comments("r1").unwrap()))
            .await
            .unwrap();
        assert_eq!(comments.len(), 1);
        assert!(store
            .query(&Query::new(CollectionPath::comments("r2").unwrap()))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_query_subscription_pushes_changes() {
        let store = LocalStore::in_memory();
        let recipes = CollectionPath::recipes();
        let query = Query::new(recipes.clone()).order_by("timestamp", Direction::Descending);

        let mut sub = store.subscribe_query(&query).await.unwrap();
        match sub.next().await {
            Some(Push::Update(docs)) => assert!(docs.is_empty()),
            other => panic!("unexpected push: {:?}", other),
        }

        let id = store
            .add_document(&recipes, fields(&[("timestamp", FieldValue::ServerTimestamp)]))
            .await
            .unwrap();

        match sub.next().await {
            Some(Push::Update(docs)) => {
                assert_eq!(docs.len(), 1);
                assert_eq!(docs[0].id, id);
            }
            other => panic!("unexpected push: {:?}", other),
        }

        sub.cancel();
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn test_document_subscription_sees_deletion() {
        let store = LocalStore::in_memory();
        let path = DocumentPath::user("u1").unwrap();
        store.set_document(&path, Fields::new()).await.unwrap();

        let mut sub = store.subscribe_document(&path).await.unwrap();
        assert!(matches!(sub.next().await, Some(Push::Update(Some(_)))));

        store.delete_document(&path).await.unwrap();
        assert!(matches!(sub.next().await, Some(Push::Update(None))));
    }

    #[tokio::test]
    async fn test_subscribe_invalid_query_fails() {
        let store = LocalStore::in_memory();
        let query = Query::new(CollectionPath::recipes()).filter(Filter::IdIn(Vec::new()));
        assert!(store.subscribe_query(&query).await.is_err());
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = DocumentPath::recipe("r1").unwrap();

        {
            let store = LocalStore::open(temp_dir.path()).unwrap();
            store
                .set_document(
                    &path,
                    fields(&[
                        ("title", "Soup".into()),
                        ("timestamp", FieldValue::ServerTimestamp),
                    ]),
                )
                .await
                .unwrap();
        }

        let store = LocalStore::open(temp_dir.path()).unwrap();
        let doc = store.get_document(&path).await.unwrap().unwrap();
        assert_eq!(doc.get_str("title"), Some("Soup"));
        assert!(doc.get_timestamp("timestamp").is_some());
    }

    #[tokio::test]
    async fn test_subscription_sees_writes_from_another_store() {
        let temp_dir = TempDir::new().unwrap();
        let watcher = LocalStore::open(temp_dir.path()).unwrap();
        let writer = LocalStore::open(temp_dir.path()).unwrap();
        let recipes = CollectionPath::recipes();

        let mut sub = watcher.subscribe_query(&Query::new(recipes.clone())).await.unwrap();
        assert!(matches!(sub.next().await, Some(Push::Update(docs)) if docs.is_empty()));

        let id = writer
            .add_document(&recipes, fields(&[("title", "Soup".into())]))
            .await
            .unwrap();

        let push = timeout(Duration::from_secs(2), sub.next())
            .await
            .expect("watcher never saw the other store's write");
        match push {
            Some(Push::Update(docs)) => {
                assert_eq!(docs.len(), 1);
                assert_eq!(docs[0].id, id);
            }
            other => panic!("unexpected push: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stores_sharing_a_directory_keep_both_writes() {
        let temp_dir = TempDir::new().unwrap();
        let first = LocalStore::open(temp_dir.path()).unwrap();
        let second = LocalStore::open(temp_dir.path()).unwrap();
        let ra = DocumentPath::recipe("ra").unwrap();
        let rb = DocumentPath::recipe("rb").unwrap();

        first
            .set_document(&ra, fields(&[("title", "Soup".into())]))
            .await
            .unwrap();
        second
            .set_document(&rb, fields(&[("title", "Salad".into())]))
            .await
            .unwrap();

        // The second save pulled in the first store's document.
        assert!(second.get_document(&ra).await.unwrap().is_some());

        let reopened = LocalStore::open(temp_dir.path()).unwrap();
        assert!(reopened.get_document(&ra).await.unwrap().is_some());
        assert!(reopened.get_document(&rb).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_save_leaves_no_trace() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("data");
        let store = LocalStore::open(&data_dir).unwrap();
        let recipes = CollectionPath::recipes();

        // A plain file where the data directory should be makes every save fail.
        std::fs::write(&data_dir, b"in the way").unwrap();
        let result = store
            .add_document(&recipes, fields(&[("title", "Lost".into())]))
            .await;
        assert!(result.is_err());
        assert!(store.query(&Query::new(recipes.clone())).await.unwrap().is_empty());

        std::fs::remove_file(&data_dir).unwrap();
        store
            .add_document(&recipes, fields(&[("title", "Kept".into())]))
            .await
            .unwrap();

        let reopened = LocalStore::open(&data_dir).unwrap();
        let docs = reopened.query(&Query::new(recipes)).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].get_str("title"), Some("Kept"));
    }

    #[test]
    fn test_member_id_only_matches_direct_children() {
        let recipes = CollectionPath::recipes();
        assert_eq!(member_id(&recipes, "recipes/r1"), Some("r1"));
        assert_eq!(member_id(&recipes, "recipes/r1/comments/c1"), None);
        assert_eq!(member_id(&recipes, "recipesx/r1"), None);
        assert_eq!(member_id(&recipes, "users/u1"), None);
    }
}
