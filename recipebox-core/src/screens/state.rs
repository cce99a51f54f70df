//! Per-screen lifecycle state.

use std::fmt;

use crate::error::RecipeError;

/// `Loading -> {Ready, Error}`. `Ready` may be replaced by a newer `Ready`;
/// nothing leaves `Error` and nothing returns to `Loading`.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenState<V> {
    Loading,
    Ready(V),
    Error(String),
}

impl<V> Default for ScreenState<V> {
    fn default() -> Self {
        ScreenState::Loading
    }
}

impl<V> ScreenState<V> {
    /// Applies the outcome of a push. Ignored once in `Error`.
    pub fn apply(&mut self, outcome: Result<V, RecipeError>) {
        match outcome {
            Ok(view) => self.ready(view),
            Err(e) => self.fail(e.to_string()),
        }
    }

    pub fn ready(&mut self, view: V) {
        if !self.is_error() {
            *self = ScreenState::Ready(view);
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        if !self.is_error() {
            *self = ScreenState::Error(message.into());
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ScreenState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ScreenState::Ready(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ScreenState::Error(_))
    }

    pub fn view(&self) -> Option<&V> {
        match self {
            ScreenState::Ready(view) => Some(view),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ScreenState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Transient message for a failed user action. Never changes screen state.
#[derive(Debug)]
pub struct Notice {
    error: RecipeError,
}

impl Notice {
    pub fn error(&self) -> &RecipeError {
        &self.error
    }

    pub fn into_error(self) -> RecipeError {
        self.error
    }
}

impl From<RecipeError> for Notice {
    fn from(error: RecipeError) -> Self {
        Self { error }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for Notice {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
