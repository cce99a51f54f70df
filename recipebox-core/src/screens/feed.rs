//! Recipe list screen: the shared feed with the viewer's favorite flags.

use std::collections::BTreeSet;

use tracing::debug;

use super::join::AuthorDirectory;
use super::state::{Notice, ScreenState};
use super::views::{reduce_feed, RecipeCard};
use super::{cancel, next_push, Screen};
use crate::error::RecipeError;
use crate::models::{Recipe, UserProfile};
use crate::repository::{decode_all, RecipeRepository};
use crate::session::Session;
use crate::store::{Document, Push, Subscription};

pub struct RecipeListScreen {
    repo: RecipeRepository,
    authors: AuthorDirectory,
    session: Session,
    recipes_sub: Option<Subscription<Vec<Document>>>,
    profile_sub: Option<Subscription<Option<Document>>>,
    recipes: Option<Vec<Recipe>>,
    favorites: BTreeSet<String>,
    profile_seen: bool,
    state: ScreenState<Vec<RecipeCard>>,
}

impl RecipeListScreen {
    /// Opens the feed and profile subscriptions.
    pub async fn mount(repo: RecipeRepository, authors: AuthorDirectory, session: Session) -> Self {
        let mut screen = Self {
            repo,
            authors,
            session,
            recipes_sub: None,
            profile_sub: None,
            recipes: None,
            favorites: BTreeSet::new(),
            profile_seen: false,
            state: ScreenState::Loading,
        };

        match screen.open().await {
            Ok(()) => debug!(user_id = %screen.session.user_id(), "recipe list mounted"),
            Err(e) => screen.fail(e),
        }
        screen
    }

    async fn open(&mut self) -> Result<(), RecipeError> {
        self.recipes_sub = Some(self.repo.subscribe_recipes().await?);
        self.profile_sub = Some(self.repo.subscribe_profile(self.session.user_id()).await?);
        Ok(())
    }

    pub fn favorites(&self) -> &BTreeSet<String> {
        &self.favorites
    }

    async fn render(&mut self) {
        let Some(recipes) = &self.recipes else {
            return;
        };
        let outcome = match self
            .authors
            .resolve(recipes.iter().map(|r| r.user_id.as_str()))
            .await
        {
            Ok(names) => Ok(reduce_feed(recipes, &names, &self.favorites)),
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

    /// Adds or removes a favorite; returns whether it is now a favorite.
    pub async fn toggle_favorite(&self, recipe_id: &str) -> Result<bool, Notice> {
        let user_id = self.session.user_id();
        if self.favorites.contains(recipe_id) {
            self.repo.remove_from_favorites(user_id, recipe_id).await?;
            Ok(false)
        } else {
            self.repo.add_to_favorites(user_id, recipe_id).await?;
            Ok(true)
        }
    }
}

impl Screen for RecipeListScreen {
    type View = Vec<RecipeCard>;

    fn state(&self) -> &ScreenState<Self::View> {
        &self.state
    }

    fn is_settled(&self) -> bool {
        self.state.is_error() || (self.recipes.is_some() && self.profile_seen)
    }

    async fn next_update(&mut self) -> bool {
        if self.state.is_error() || (self.recipes_sub.is_none() && self.profile_sub.is_none()) {
            return false;
        }

        tokio::select! {
            push = next_push(&mut self.recipes_sub) => match push {
                Some(Push::Update(docs)) => {
                    self.recipes = Some(decode_all(&docs, Recipe::from_document));
                    self.render().await;
                }
                Some(Push::Error(e)) => self.fail(RecipeError::Sync(e)),
                None => self.recipes_sub = None,
            },
            push = next_push(&mut self.profile_sub) => match push {
                Some(Push::Update(doc)) => {
                    self.profile_seen = true;
                    self.favorites = doc
                        .and_then(|doc| UserProfile::from_document(&doc).ok())
                        .map(|profile| profile.favorites)
                        .unwrap_or_default();
                    if self.recipes.is_some() {
                        self.render().await;
                    }
                }
                Some(Push::Error(e)) => self.fail(RecipeError::Sync(e)),
                None => self.profile_sub = None,
            },
        }
        true
    }

    fn unmount(&mut self) {
        cancel(&mut self.recipes_sub);
        cancel(&mut self.profile_sub);
    }
}
