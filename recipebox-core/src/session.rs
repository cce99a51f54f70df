//! Session provider: the signed-in identity and the sign-up/sign-in flows.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{AuthProvider, Identity};
use crate::error::RecipeError;
use crate::models::UserProfile;
use crate::store::{DocumentPath, DocumentStore};

/// The signed-in user, handed explicitly to every screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    user_id: String,
    email: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl From<Identity> for Session {
    fn from(identity: Identity) -> Self {
        Self::new(identity.uid, identity.email)
    }
}

/// Holds the current session and talks to the auth boundary.
pub struct SessionProvider {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn DocumentStore>,
    current: RwLock<Option<Session>>,
}

impl SessionProvider {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            auth,
            store,
            current: RwLock::new(None),
        }
    }

    /// Registers an account, writes its profile, and signs it in.
    ///
    /// If the profile write fails the account is left in place and the error
    /// is [`RecipeError::ProfileWrite`].
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<Session, RecipeError> {
        let identity = self.auth.create_identity(email, password).await?;
        let user_id = identity.uid.clone();

        let fields = UserProfile::new_fields(&identity.uid, &identity.email, username);
        let written = match DocumentPath::user(&identity.uid) {
            Ok(path) => self.store.set_document(&path, fields).await,
            Err(e) => Err(e),
        };
        if let Err(source) = written {
            warn!(user_id = %user_id, error = %source, "profile write failed after sign-up");
            return Err(RecipeError::ProfileWrite { user_id, source });
        }

        info!(user_id = %user_id, "signed up");
        Ok(self.set_current(identity.into()))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, RecipeError> {
        let identity = self.auth.authenticate(email, password).await?;
        info!(user_id = %identity.uid, "signed in");
        Ok(self.set_current(identity.into()))
    }

    pub fn sign_out(&self) {
        if let Some(session) = self.replace(None) {
            info!(user_id = %session.user_id(), "signed out");
        }
    }

    /// Restores a session established earlier, e.g. one read back from disk.
    pub fn resume(&self, session: Session) -> Session {
        self.set_current(session)
    }

    /// The signed-in session, if any.
    pub fn current(&self) -> Option<Session> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The signed-in session, or a validation error when signed out.
    pub fn require(&self) -> Result<Session, RecipeError> {
        self.current()
            .ok_or_else(|| RecipeError::validation("not signed in"))
    }

    fn set_current(&self, session: Session) -> Session {
        self.replace(Some(session.clone()));
        session
    }

    fn replace(&self, session: Option<Session>) -> Option<Session> {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, session)
    }
}
