//! Recipe repository: domain operations expressed as document store calls.
//!
//! The repository checks nothing the managed store would not check. Input
//! validation belongs to the calling screen, and comment ownership is only
//! checked by the detail screen before it calls [`RecipeRepository::delete_comment`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{ModelError, RecipeError};
use crate::models::{Comment, NewComment, NewRecipe, Recipe, UserProfile};
use crate::store::{
    CollectionPath, Direction, Document, DocumentPath, DocumentStore, Filter, Query, Subscription,
    MAX_IN_VALUES,
};

const FAVORITES: &str = "favorites";
const TIMESTAMP: &str = "timestamp";

/// Domain operations over a [`DocumentStore`].
#[derive(Clone)]
pub struct RecipeRepository {
    store: Arc<dyn DocumentStore>,
}

impl RecipeRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    // ========== Writes ==========

    /// Creates a recipe stamped with the store's clock and returns its id.
    pub async fn add_recipe(
        &self,
        title: &str,
        ingredients: &str,
        instructions: &str,
        user_id: &str,
        image_url: Option<&str>,
    ) -> Result<String, RecipeError> {
        let mut recipe = NewRecipe::new(title, ingredients, instructions, user_id);
        if let Some(url) = image_url {
            recipe = recipe.with_image_url(url);
        }

        let id = self
            .store
            .add_document(&CollectionPath::recipes(), recipe.to_fields())
            .await?;
        debug!(recipe_id = %id, user_id, "recipe added");
        Ok(id)
    }

    /// Adds a recipe to the user's favorites. Idempotent.
    ///
    /// Fails with [`RecipeError::NotFound`] if the recipe does not exist.
    pub async fn add_to_favorites(&self, user_id: &str, recipe_id: &str) -> Result<(), RecipeError> {
        let recipe_path = DocumentPath::recipe(recipe_id)?;
        if self.store.get_document(&recipe_path).await?.is_none() {
            return Err(RecipeError::NotFound(recipe_path.to_string()));
        }

        self.store
            .add_to_set(&DocumentPath::user(user_id)?, FAVORITES, recipe_id.into())
            .await?;
        debug!(user_id, recipe_id, "favorite added");
        Ok(())
    }

    /// Removes a recipe from the user's favorites. Idempotent.
    pub async fn remove_from_favorites(
        &self,
        user_id: &str,
        recipe_id: &str,
    ) -> Result<(), RecipeError> {
        self.store
            .remove_from_set(&DocumentPath::user(user_id)?, FAVORITES, recipe_id.into())
            .await?;
        debug!(user_id, recipe_id, "favorite removed");
        Ok(())
    }

    /// Adds a comment under a recipe and returns its id.
    pub async fn add_comment(
        &self,
        recipe_id: &str,
        text: &str,
        user_id: &str,
    ) -> Result<String, RecipeError> {
        let comment = NewComment::new(text, user_id);
        let id = self
            .store
            .add_document(&CollectionPath::comments(recipe_id)?, comment.to_fields())
            .await?;
        debug!(recipe_id, comment_id = %id, "comment added");
        Ok(id)
    }

    /// Deletes a comment. The caller is responsible for the ownership check.
    pub async fn delete_comment(&self, recipe_id: &str, comment_id: &str) -> Result<(), RecipeError> {
        self.store
            .delete_document(&DocumentPath::comment(recipe_id, comment_id)?)
            .await?;
        debug!(recipe_id, comment_id, "comment deleted");
        Ok(())
    }

    // ========== Reads ==========

    pub async fn get_recipe(&self, recipe_id: &str) -> Result<Recipe, RecipeError> {
        let path = DocumentPath::recipe(recipe_id)?;
        let doc = self
            .store
            .get_document(&path)
            .await?
            .ok_or_else(|| RecipeError::NotFound(path.to_string()))?;
        Ok(Recipe::from_document(&doc)?)
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile, RecipeError> {
        let path = DocumentPath::user(user_id)?;
        self.find_profile(user_id)
            .await?
            .ok_or_else(|| RecipeError::NotFound(path.to_string()))
    }

    /// Reads a profile, `None` if the user has none.
    pub async fn find_profile(&self, user_id: &str) -> Result<Option<UserProfile>, RecipeError> {
        let path = DocumentPath::user(user_id)?;
        match self.store.get_document(&path).await? {
            Some(doc) => Ok(Some(UserProfile::from_document(&doc)?)),
            None => Ok(None),
        }
    }

    /// Reads the given recipes, newest first.
    ///
    /// Ids are queried in batches of [`MAX_IN_VALUES`]. Ids with no recipe are
    /// skipped, and an empty input issues no query at all.
    pub async fn recipes_by_ids(&self, ids: &[String]) -> Result<Vec<Recipe>, RecipeError> {
        let mut unique: Vec<String> = ids.to_vec();
        unique.sort();
        unique.dedup();

        let mut docs = Vec::with_capacity(unique.len());
        for batch in unique.chunks(MAX_IN_VALUES) {
            let query = Query::new(CollectionPath::recipes())
                .filter(Filter::IdIn(batch.to_vec()))
                .order_by(TIMESTAMP, Direction::Descending);
            docs.extend(self.store.query(&query).await?);
        }

        let mut recipes = decode_all(&docs, Recipe::from_document);
        sort_newest_first(&mut recipes, |r| (r.timestamp, r.id.as_str()));
        Ok(recipes)
    }

    /// All recipes, newest first.
    pub async fn list_recipes(&self) -> Result<Vec<Recipe>, RecipeError> {
        let docs = self.store.query(&Self::recipes_query()).await?;
        Ok(decode_all(&docs, Recipe::from_document))
    }

    /// A recipe's comments, newest first.
    pub async fn list_comments(&self, recipe_id: &str) -> Result<Vec<Comment>, RecipeError> {
        let docs = self.store.query(&Self::comments_query(recipe_id)?).await?;
        Ok(decode_all(&docs, Comment::from_document))
    }

    // ========== Live queries ==========

    /// The feed query: every recipe, newest first.
    pub fn recipes_query() -> Query {
        Query::new(CollectionPath::recipes()).order_by(TIMESTAMP, Direction::Descending)
    }

    /// A recipe's comments, newest first.
    pub fn comments_query(recipe_id: &str) -> Result<Query, RecipeError> {
        Ok(Query::new(CollectionPath::comments(recipe_id)?).order_by(TIMESTAMP, Direction::Descending))
    }

    pub async fn subscribe_recipes(&self) -> Result<Subscription<Vec<Document>>, RecipeError> {
        self.store
            .subscribe_query(&Self::recipes_query())
            .await
            .map_err(RecipeError::Sync)
    }

    pub async fn subscribe_comments(
        &self,
        recipe_id: &str,
    ) -> Result<Subscription<Vec<Document>>, RecipeError> {
        let query = Self::comments_query(recipe_id)?;
        self.store
            .subscribe_query(&query)
            .await
            .map_err(RecipeError::Sync)
    }

    pub async fn subscribe_profile(
        &self,
        user_id: &str,
    ) -> Result<Subscription<Option<Document>>, RecipeError> {
        let path = DocumentPath::user(user_id)?;
        self.store
            .subscribe_document(&path)
            .await
            .map_err(RecipeError::Sync)
    }
}

/// Decodes every document, skipping (and logging) the ones that do not decode.
pub(crate) fn decode_all<T>(
    docs: &[Document],
    decode: impl Fn(&Document) -> Result<T, ModelError>,
) -> Vec<T> {
    docs.iter()
        .filter_map(|doc| match decode(doc) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(error = %e, "skipping undecodable document");
                None
            }
        })
        .collect()
}

/// Sorts by timestamp descending, ties broken by id ascending.
pub(crate) fn sort_newest_first<T, K>(items: &mut [T], key: impl Fn(&T) -> (K, &str))
where
    K: Ord,
{
    items.sort_by(|a, b| {
        let (ka, ia) = key(a);
        let (kb, ib) = key(b);
        kb.cmp(&ka).then_with(|| ia.cmp(ib))
    });
}
