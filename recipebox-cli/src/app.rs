//! Wiring of the local store, accounts and session for one invocation.

use recipebox_core::{
    AuthorDirectory, LocalAuth, LocalStore, RecipeRepository, Session, SessionProvider,
};
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::session_file::SessionFile;

pub struct App {
    pub sessions: SessionProvider,
    pub repo: RecipeRepository,
    pub session_file: SessionFile,
    join_concurrency: usize,
}

impl App {
    pub fn open(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let data_dir = &config.data_dir.value;
        let auth = LocalAuth::open(data_dir.clone())?;
        let store = Arc::new(LocalStore::open(data_dir.clone())?);
        debug!(data_dir = %data_dir.display(), "opened local data");

        Ok(Self {
            sessions: SessionProvider::new(Arc::new(auth), store.clone()),
            repo: RecipeRepository::new(store),
            session_file: SessionFile::in_dir(data_dir),
            join_concurrency: config.join_concurrency.value,
        })
    }

    pub fn authors(&self) -> AuthorDirectory {
        AuthorDirectory::new(self.repo.clone()).with_concurrency(self.join_concurrency)
    }

    /// The session saved by `login`/`signup`.
    pub fn require_session(&self) -> Result<Session, Box<dyn std::error::Error>> {
        match self.session_file.load()? {
            Some(session) => {
                self.sessions.resume(session);
                Ok(self.sessions.require()?)
            }
            None => Err("Not logged in. Run 'recipebox login' or 'recipebox signup' first.".into()),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_require_session_without_login() {
        let dir = TempDir::new().unwrap();
        let app = test_app::open(&dir);

        let err = app.require_session().unwrap_err();
        assert!(err.to_string().contains("Not logged in"));
    }

    #[test]
    fn test_require_session_resumes_saved_session() {
        let dir = TempDir::new().unwrap();
        let app = test_app::open(&dir);
        let session = Session::new("u1", "alice@example.com");
        app.session_file.save(&session).unwrap();

        assert_eq!(app.require_session().unwrap(), session);
        assert_eq!(app.sessions.current(), Some(session));
    }

    #[test]
    fn test_authors_use_configured_concurrency() {
        let dir = TempDir::new().unwrap();
        let app = test_app::open(&dir);
        assert_eq!(app.authors().concurrency(), 2);
    }
}
