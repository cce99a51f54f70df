//! RecipeBox Core Library
//!
//! Models, the auth and document store boundaries with their local
//! implementations, the session provider, the recipe repository, and the
//! screen reducers shared by RecipeBox front ends.

pub mod auth;
pub mod error;
pub mod models;
pub mod persist;
pub mod repository;
pub mod screens;
pub mod session;
pub mod store;

#[cfg(test)]
mod test_support;

pub use auth::{AuthError, AuthProvider, Identity, LocalAuth};
pub use error::{ModelError, RecipeError};
pub use models::{Comment, NewComment, NewRecipe, Recipe, UserProfile};
pub use repository::RecipeRepository;
pub use screens::{
    AddRecipeForm, AuthForm, AuthorDirectory, FavoritesScreen, Notice, RecipeDetailScreen,
    RecipeListScreen, Screen, ScreenState,
};
pub use session::{Session, SessionProvider};
pub use store::{DocumentStore, LocalStore, StoreError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
