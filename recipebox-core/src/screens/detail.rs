//! Recipe detail screen: one recipe, its favorite flag, and its comments.

use tracing::debug;

use super::join::{author_name, AuthorDirectory};
use super::state::{Notice, ScreenState};
use super::views::{is_favorite, reduce_comments, RecipeDetail};
use super::{cancel, next_push, Screen};
use crate::error::RecipeError;
use crate::models::{Comment, Recipe, UserProfile};
use crate::repository::{decode_all, RecipeRepository};
use crate::session::Session;
use crate::store::{Document, Push, Subscription};

pub struct RecipeDetailScreen {
    repo: RecipeRepository,
    authors: AuthorDirectory,
    session: Session,
    recipe_id: String,
    recipe: Option<Recipe>,
    profile_sub: Option<Subscription<Option<Document>>>,
    comments_sub: Option<Subscription<Vec<Document>>>,
    profile: Option<UserProfile>,
    comments: Option<Vec<Comment>>,
    profile_seen: bool,
    state: ScreenState<RecipeDetail>,
}

impl RecipeDetailScreen {
    /// Reads the recipe, then opens the profile and comment subscriptions.
    pub async fn mount(
        repo: RecipeRepository,
        authors: AuthorDirectory,
        session: Session,
        recipe_id: &str,
    ) -> Self {
        let mut screen = Self {
            repo,
            authors,
            session,
            recipe_id: recipe_id.to_string(),
            recipe: None,
            profile_sub: None,
            comments_sub: None,
            profile: None,
            comments: None,
            profile_seen: false,
            state: ScreenState::Loading,
        };

        match screen.open().await {
            Ok(()) => debug!(recipe_id, "recipe detail mounted"),
            Err(e) => screen.fail(e),
        }
        screen
    }

    async fn open(&mut self) -> Result<(), RecipeError> {
        self.recipe = Some(self.repo.get_recipe(&self.recipe_id).await?);
        self.profile_sub = Some(self.repo.subscribe_profile(self.session.user_id()).await?);
        self.comments_sub = Some(self.repo.subscribe_comments(&self.recipe_id).await?);
        Ok(())
    }

    pub fn recipe_id(&self) -> &str {
        &self.recipe_id
    }

    /// Adds or removes this recipe from the viewer's favorites; returns
    /// whether it is now a favorite.
    pub async fn toggle_favorite(&self) -> Result<bool, Notice> {
        let user_id = self.session.user_id();
        if is_favorite(self.profile.as_ref(), &self.recipe_id) {
            self.repo.remove_from_favorites(user_id, &self.recipe_id).await?;
            Ok(false)
        } else {
            self.repo.add_to_favorites(user_id, &self.recipe_id).await?;
            Ok(true)
        }
    }

    /// Posts a comment as the viewer.
    ///
    /// The text is trimmed; blank text posts nothing and returns `None`.
    pub async fn add_comment(&self, text: &str) -> Result<Option<String>, Notice> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let id = self
            .repo
            .add_comment(&self.recipe_id, text, self.session.user_id())
            .await?;
        Ok(Some(id))
    }

    /// Deletes one of the viewer's own comments.
    ///
    /// Only the author may delete a comment. That rule is checked here and
    /// nowhere else.
    pub async fn delete_comment(&self, comment_id: &str) -> Result<(), Notice> {
        let comment = self
            .comments
            .as_ref()
            .and_then(|comments| comments.iter().find(|c| c.id == comment_id))
            .ok_or_else(|| RecipeError::NotFound(format!("comment {}", comment_id)))?;

        if !comment.is_owned_by(self.session.user_id()) {
            return Err(RecipeError::validation("You can only delete your own comments").into());
        }

        self.repo.delete_comment(&self.recipe_id, comment_id).await?;
        Ok(())
    }

    async fn render(&mut self) {
        let (Some(recipe), Some(comments)) = (&self.recipe, &self.comments) else {
            return;
        };

        let author_ids = comments
            .iter()
            .map(|c| c.user_id.as_str())
            .chain(std::iter::once(recipe.user_id.as_str()));
        let outcome = match self.authors.resolve(author_ids).await {
            Ok(names) => Ok(RecipeDetail {
                recipe: recipe.clone(),
                author: author_name(&names, &recipe.user_id),
                is_favorite: is_favorite(self.profile.as_ref(), &recipe.id),
                comments: reduce_comments(comments, &names, self.session.user_id()),
            }),
            Err(e) => Err(e),
        };

        self.state.apply(outcome);
        if self.state.is_error() {
            self.unmount();
        }
    }

    fn fail(&mut self, error: RecipeError) {
        self.state.fail(error.to_string());
        self.unmount();
    }
}

impl Screen for RecipeDetailScreen {
    type View = RecipeDetail;

    fn state(&self) -> &ScreenState<Self::View> {
        &self.state
    }

    fn is_settled(&self) -> bool {
        self.state.is_error() || (self.comments.is_some() && self.profile_seen)
    }

    async fn next_update(&mut self) -> bool {
        if self.state.is_error() || (self.profile_sub.is_none() && self.comments_sub.is_none()) {
            return false;
        }

        tokio::select! {
            push = next_push(&mut self.comments_sub) => match push {
                Some(Push::Update(docs)) => {
                    self.comments = Some(decode_all(&docs, Comment::from_document));
                    self.render().await;
                }
                Some(Push::Error(e)) => self.fail(RecipeError::Sync(e)),
                None => self.comments_sub = None,
            },
            push = next_push(&mut self.profile_sub) => match push {
                Some(Push::Update(doc)) => {
                    self.profile_seen = true;
                    self.profile = doc.and_then(|doc| UserProfile::from_document(&doc).ok());
                    self.render().await;
                }
                Some(Push::Error(e)) => self.fail(RecipeError::Sync(e)),
                None => self.profile_sub = None,
            },
        }
        true
    }

    fn unmount(&mut self) {
        cancel(&mut self.profile_sub);
        cancel(&mut self.comments_sub);
    }
}
