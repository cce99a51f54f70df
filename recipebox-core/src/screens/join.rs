//! Author name join for denormalized views.

use std::collections::{BTreeSet, HashMap};

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::error::RecipeError;
use crate::repository::RecipeRepository;

/// Display name shown for authors without a readable profile.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Default number of profile reads in flight during a join.
pub const DEFAULT_JOIN_CONCURRENCY: usize = 8;

/// Author id to display name.
pub type AuthorNames = HashMap<String, String>;

/// Resolves user ids to display names with bounded concurrency.
#[derive(Clone)]
pub struct AuthorDirectory {
    repo: RecipeRepository,
    concurrency: usize,
}

impl AuthorDirectory {
    pub fn new(repo: RecipeRepository) -> Self {
        Self {
            repo,
            concurrency: DEFAULT_JOIN_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Reads each distinct author once.
    ///
    /// Authors without a profile, or whose profile does not decode, map to
    /// [`UNKNOWN_AUTHOR`]. Any other read failure fails the whole join.
    pub async fn resolve<'a, I>(&self, user_ids: I) -> Result<AuthorNames, RecipeError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let distinct: BTreeSet<String> = user_ids.into_iter().map(str::to_string).collect();
        debug!(authors = distinct.len(), concurrency = self.concurrency, "joining authors");

        let results: Vec<(String, Result<String, RecipeError>)> = stream::iter(distinct)
            .map(|user_id| {
                let repo = self.repo.clone();
                async move {
                    let name = match repo.find_profile(&user_id).await {
                        Ok(Some(profile)) => Ok(profile.username),
                        Ok(None) => Ok(UNKNOWN_AUTHOR.to_string()),
                        Err(RecipeError::Model(e)) => {
                            warn!(user_id = %user_id, error = %e, "unreadable author profile");
                            Ok(UNKNOWN_AUTHOR.to_string())
                        }
                        Err(e) => Err(e),
                    };
                    (user_id, name)
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut names = AuthorNames::with_capacity(results.len());
        for (user_id, name) in results {
            names.insert(user_id, name?);
        }
        Ok(names)
    }
}

/// Looks up a resolved author, falling back to [`UNKNOWN_AUTHOR`].
pub fn author_name(names: &AuthorNames, user_id: &str) -> String {
    names
        .get(user_id)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserProfile;
    use crate::store::{DocumentPath, DocumentStore, Fields, LocalStore};
    use std::sync::Arc;

    async fn directory() -> (AuthorDirectory, LocalStore) {
        let store = LocalStore::in_memory();
        for (uid, name) in [("u1", "alice"), ("u2", "bob")] {
            store
                .set_document(
                    &DocumentPath::user(uid).unwrap(),
                    UserProfile::new_fields(uid, &format!("{}@example.com", name), name),
                )
                .await
                .unwrap();
        }
        let repo = RecipeRepository::new(Arc::new(store.clone()));
        (AuthorDirectory::new(repo).with_concurrency(2), store)
    }

    #[tokio::test]
    async fn test_resolve_names() {
        let (authors, _store) = directory().await;
        let names = authors.resolve(["u1", "u2", "u1"]).await.unwrap();

        assert_eq!(names.len(), 2);
        assert_eq!(author_name(&names, "u1"), "alice");
        assert_eq!(author_name(&names, "u2"), "bob");
    }

    #[tokio::test]
    async fn test_unknown_authors() {
        let (authors, store) = directory().await;
        store
            .set_document(&DocumentPath::user("broken").unwrap(), Fields::new())
            .await
            .unwrap();

        let names = authors.resolve(["ghost", "broken"]).await.unwrap();
        assert_eq!(author_name(&names, "ghost"), UNKNOWN_AUTHOR);
        assert_eq!(author_name(&names, "broken"), UNKNOWN_AUTHOR);
        assert_eq!(author_name(&names, "never-asked"), UNKNOWN_AUTHOR);
    }

    #[tokio::test]
    async fn test_empty_join() {
        let (authors, _store) = directory().await;
        let names = authors.resolve(std::iter::empty()).await.unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn test_concurrency_floor() {
        let repo = RecipeRepository::new(Arc::new(LocalStore::in_memory()));
        assert_eq!(AuthorDirectory::new(repo.clone()).concurrency(), DEFAULT_JOIN_CONCURRENCY);
        assert_eq!(AuthorDirectory::new(repo).with_concurrency(0).concurrency(), 1);
    }
}
