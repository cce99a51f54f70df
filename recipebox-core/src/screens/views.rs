//! View models and the pure reducers that build them from pushed snapshots.

use std::collections::BTreeSet;

use serde::Serialize;

use super::join::{author_name, AuthorNames};
use crate::models::{Comment, Recipe, UserProfile};

/// One row of the feed or favorites list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeCard {
    pub recipe: Recipe,
    pub author: String,
    pub is_favorite: bool,
}

/// One comment on the detail screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    pub comment: Comment,
    pub author: String,
    /// Whether the viewer may delete it (they wrote it).
    pub can_delete: bool,
}

/// The detail screen's view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub author: String,
    pub is_favorite: bool,
    pub comments: Vec<CommentView>,
}

/// Builds feed rows in snapshot order.
pub fn reduce_feed(
    recipes: &[Recipe],
    authors: &AuthorNames,
    favorites: &BTreeSet<String>,
) -> Vec<RecipeCard> {
    recipes
        .iter()
        .map(|recipe| RecipeCard {
            recipe: recipe.clone(),
            author: author_name(authors, &recipe.user_id),
            is_favorite: favorites.contains(&recipe.id),
        })
        .collect()
}

/// Builds comment rows in snapshot order, marking the viewer's own comments.
pub fn reduce_comments(
    comments: &[Comment],
    authors: &AuthorNames,
    viewer_id: &str,
) -> Vec<CommentView> {
    comments
        .iter()
        .map(|comment| CommentView {
            comment: comment.clone(),
            author: author_name(authors, &comment.user_id),
            can_delete: comment.is_owned_by(viewer_id),
        })
        .collect()
}

/// Whether the profile (if any) has favorited the recipe.
pub fn is_favorite(profile: Option<&UserProfile>, recipe_id: &str) -> bool {
    profile.is_some_and(|p| p.is_favorite(recipe_id))
}
