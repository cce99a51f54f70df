//! View screens: state derived from live subscriptions plus user actions.
//!
//! A screen opens its subscriptions when mounted, re-renders on every push,
//! and cancels them on unmount. Screens own no durable state; user actions go
//! through the [`RecipeRepository`](crate::repository::RecipeRepository) and
//! come back as the next push.

mod detail;
mod favorites;
mod feed;
mod forms;
mod join;
mod state;
mod views;

pub use detail::RecipeDetailScreen;
pub use favorites::FavoritesScreen;
pub use feed::RecipeListScreen;
pub use forms::{AddRecipeForm, AuthForm, AuthMode};
pub use join::{author_name, AuthorDirectory, AuthorNames, DEFAULT_JOIN_CONCURRENCY, UNKNOWN_AUTHOR};
pub use state::{Notice, ScreenState};
pub use views::{is_favorite, reduce_comments, reduce_feed, CommentView, RecipeCard, RecipeDetail};

use crate::store::{Push, Subscription};

/// A mounted screen driven by live pushes.
#[allow(async_fn_in_trait)]
pub trait Screen {
    type View;

    fn state(&self) -> &ScreenState<Self::View>;

    /// Whether every subscription has delivered its first snapshot, or the
    /// screen has failed.
    fn is_settled(&self) -> bool;

    /// Waits for the next push and re-renders. Returns `false` once nothing
    /// more can arrive.
    async fn next_update(&mut self) -> bool;

    /// Cancels every subscription.
    fn unmount(&mut self);

    /// Processes pushes until the screen is settled.
    async fn wait_settled(&mut self) {
        while !self.is_settled() {
            if !self.next_update().await {
                break;
            }
        }
    }
}

/// Next push from an optional subscription; pends forever when absent.
pub(crate) async fn next_push<T>(sub: &mut Option<Subscription<T>>) -> Option<Push<T>> {
    match sub {
        Some(sub) => sub.next().await,
        None => std::future::pending().await,
    }
}

pub(crate) fn cancel<T>(sub: &mut Option<Subscription<T>>) {
    if let Some(mut sub) = sub.take() {
        sub.cancel();
    }
}
