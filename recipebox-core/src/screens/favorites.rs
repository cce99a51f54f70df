//! Favorites screen: the viewer's favorited recipes, newest first.

use std::collections::BTreeSet;

use tracing::debug;

use super::join::AuthorDirectory;
use super::state::{Notice, ScreenState};
use super::views::{reduce_feed, RecipeCard};
use super::{cancel, next_push, Screen};
use crate::error::RecipeError;
use crate::models::UserProfile;
use crate::repository::RecipeRepository;
use crate::session::Session;
use crate::store::{Document, Push, Subscription};

pub struct FavoritesScreen {
    repo: RecipeRepository,
    authors: AuthorDirectory,
    session: Session,
    profile_sub: Option<Subscription<Option<Document>>>,
    state: ScreenState<Vec<RecipeCard>>,
}

impl FavoritesScreen {
    /// Opens the profile subscription.
    pub async fn mount(repo: RecipeRepository, authors: AuthorDirectory, session: Session) -> Self {
        let mut screen = Self {
            repo,
            authors,
            session,
            profile_sub: None,
            state: ScreenState::Loading,
        };

        match screen.repo.subscribe_profile(screen.session.user_id()).await {
            Ok(sub) => {
                screen.profile_sub = Some(sub);
                debug!(user_id = %screen.session.user_id(), "favorites mounted");
            }
            Err(e) => screen.fail(e),
        }
        screen
    }

    /// Removes a recipe from the favorites.
    pub async fn remove(&self, recipe_id: &str) -> Result<(), Notice> {
        self.repo
            .remove_from_favorites(self.session.user_id(), recipe_id)
            .await?;
        Ok(())
    }

    async fn render(&mut self, profile: Option<Document>) {
        let outcome = self.build(profile).await;
        self.state.apply(outcome);
        if self.state.is_error() {
            self.unmount();
        }
    }

    async fn build(&self, profile: Option<Document>) -> Result<Vec<RecipeCard>, RecipeError> {
        let doc = profile.ok_or_else(|| {
            RecipeError::NotFound(format!("profile for {}", self.session.user_id()))
        })?;
        let favorites: BTreeSet<String> = UserProfile::from_document(&doc)?.favorites;

        if favorites.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = favorites.iter().cloned().collect();
        let recipes = self.repo.recipes_by_ids(&ids).await?;
        let names = self
            .authors
            .resolve(recipes.iter().map(|r| r.user_id.as_str()))
            .await?;
        Ok(reduce_feed(&recipes, &names, &favorites))
    }

    fn fail(&mut self, error: RecipeError) {
        self.state.fail(error.to_string());
        self.unmount();
    }
}

impl Screen for FavoritesScreen {
    type View = Vec<RecipeCard>;

    fn state(&self) -> &ScreenState<Self::View> {
        &self.state
    }

    fn is_settled(&self) -> bool {
        !self.state.is_loading()
    }

    async fn next_update(&mut self) -> bool {
        if self.state.is_error() {
            return false;
        }

        match next_push(&mut self.profile_sub).await {
            Some(Push::Update(profile)) => self.render(profile).await,
            Some(Push::Error(e)) => self.fail(RecipeError::Sync(e)),
            None => {
                self.profile_sub = None;
                return false;
            }
        }
        true
    }

    fn unmount(&mut self) {
        cancel(&mut self.profile_sub);
    }
}
