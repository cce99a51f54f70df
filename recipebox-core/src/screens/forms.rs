//! Forms: input validation in front of the repository and session provider.

use super::state::Notice;
use crate::error::RecipeError;
use crate::repository::RecipeRepository;
use crate::session::{Session, SessionProvider};

/// The add-recipe form's fields as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddRecipeForm {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub image_url: String,
}

impl AddRecipeForm {
    pub fn new(
        title: impl Into<String>,
        ingredients: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            ingredients: ingredients.into(),
            instructions: instructions.into(),
            image_url: String::new(),
        }
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Trims every field and checks the required ones.
    pub fn validate(&self) -> Result<AddRecipeForm, RecipeError> {
        let trimmed = AddRecipeForm {
            title: self.title.trim().to_string(),
            ingredients: self.ingredients.trim().to_string(),
            instructions: self.instructions.trim().to_string(),
            image_url: self.image_url.trim().to_string(),
        };

        let missing: Vec<&str> = [
            ("title", &trimmed.title),
            ("ingredients", &trimmed.ingredients),
            ("instructions", &trimmed.instructions),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(RecipeError::validation(format!(
                "Please fill in the missing fields: {}",
                missing.join(", ")
            )));
        }
        Ok(trimmed)
    }

    /// Validates and creates the recipe as the signed-in user.
    pub async fn submit(&self, repo: &RecipeRepository, session: &Session) -> Result<String, Notice> {
        let form = self.validate()?;
        let image_url = Some(form.image_url.as_str()).filter(|url| !url.is_empty());
        let id = repo
            .add_recipe(
                &form.title,
                &form.ingredients,
                &form.instructions,
                session.user_id(),
                image_url,
            )
            .await?;
        Ok(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

/// The sign-in / sign-up form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub username: String,
}

impl AuthForm {
    pub fn sign_in(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            mode: AuthMode::SignIn,
            email: email.into(),
            password: password.into(),
            username: String::new(),
        }
    }

    pub fn sign_up(
        email: impl Into<String>,
        password: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            mode: AuthMode::SignUp,
            email: email.into(),
            password: password.into(),
            username: username.into(),
        }
    }

    pub fn validate(&self) -> Result<(), RecipeError> {
        if self.email.trim().is_empty() {
            return Err(RecipeError::validation("Email is required"));
        }
        if self.password.is_empty() {
            return Err(RecipeError::validation("Password is required"));
        }
        if self.mode == AuthMode::SignUp && self.username.trim().is_empty() {
            return Err(RecipeError::validation("Username is required"));
        }
        Ok(())
    }

    /// Validates, then signs in or up through the session provider.
    pub async fn submit(&self, sessions: &SessionProvider) -> Result<Session, Notice> {
        self.validate()?;
        let email = self.email.trim();
        let session = match self.mode {
            AuthMode::SignIn => sessions.sign_in(email, &self.password).await?,
            AuthMode::SignUp => {
                sessions
                    .sign_up(email, &self.password, self.username.trim())
                    .await?
            }
        };
        Ok(session)
    }
}
