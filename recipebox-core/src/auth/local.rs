//! Local auth provider persisting accounts to an Automerge document.
//!
//! Document layout:
//! ```text
//! ROOT
//! └── "alice@example.com"          (map)
//!     ├── "uid"           -> Str (uuid v4)
//!     ├── "password_hash" -> Str (argon2 PHC string)
//!     └── "created_at"    -> Timestamp (ms)
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use automerge::transaction::Transactable;
use automerge::{AutoCommit, ObjId, ObjType, ReadDoc, ScalarValue, Value, ROOT};
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{normalize_email, validate_password, AuthError, AuthProvider, Identity};
use crate::persist::{DocType, DocumentStorage};

/// Auth provider keeping accounts in memory or in `accounts.automerge`.
#[derive(Clone)]
pub struct LocalAuth {
    inner: Arc<Inner>,
}

struct Inner {
    doc: Mutex<AutoCommit>,
    storage: Option<DocumentStorage>,
}

/// Stored account record.
struct Account {
    uid: String,
    password_hash: String,
}

impl LocalAuth {
    pub fn in_memory() -> Self {
        Self::with_parts(AutoCommit::new(), None)
    }

    /// Opens the accounts persisted in `data_dir`.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let storage = DocumentStorage::new(data_dir);
        let doc = storage
            .read_or_default(DocType::Accounts)
            .map_err(|e| AuthError::Network(e.to_string()))?;
        Ok(Self::with_parts(doc, Some(storage)))
    }

    fn with_parts(doc: AutoCommit, storage: Option<DocumentStorage>) -> Self {
        Self {
            inner: Arc::new(Inner {
                doc: Mutex::new(doc),
                storage,
            }),
        }
    }

    /// Number of registered accounts.
    pub fn account_count(&self) -> Result<usize, AuthError> {
        Ok(self.inner.lock()?.keys(ROOT).count())
    }
}

impl Inner {
    fn lock(&self) -> Result<MutexGuard<'_, AutoCommit>, AuthError> {
        self.doc
            .lock()
            .map_err(|_| AuthError::Network("accounts lock poisoned".to_string()))
    }

    /// Pulls in accounts other processes have written since this one opened.
    fn refresh(&self) -> Result<(), AuthError> {
        if let Some(storage) = &self.storage {
            let mut doc = self.lock()?;
            storage
                .merge_from_disk(DocType::Accounts, &mut doc)
                .map_err(network)?;
        }
        Ok(())
    }

    /// Writes a new account record and saves it. The caller holds the lock and
    /// restores `doc` if this fails.
    fn insert_account(
        &self,
        doc: &mut AutoCommit,
        email: &str,
        uid: &str,
        password_hash: &str,
    ) -> Result<(), AuthError> {
        if let Some(storage) = &self.storage {
            storage
                .merge_from_disk(DocType::Accounts, doc)
                .map_err(network)?;
        }
        // Re-check under the lock; hashing ran unlocked.
        if doc.get(ROOT, email).map_err(network)?.is_some() {
            return Err(AuthError::DuplicateAccount);
        }

        let obj = doc.put_object(ROOT, email, ObjType::Map).map_err(network)?;
        doc.put(&obj, "uid", uid).map_err(network)?;
        doc.put(&obj, "password_hash", password_hash).map_err(network)?;
        doc.put(
            &obj,
            "created_at",
            ScalarValue::Timestamp(Utc::now().timestamp_millis()),
        )
        .map_err(network)?;

        if let Some(storage) = &self.storage {
            storage.write(DocType::Accounts, doc).map_err(network)?;
        }
        Ok(())
    }

    fn find_account(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let doc = self.lock()?;
        let obj = match doc.get(ROOT, email).map_err(network)? {
            Some((Value::Object(ObjType::Map), obj)) => obj,
            _ => return Ok(None),
        };

        let uid = read_str(&doc, &obj, "uid")?;
        let password_hash = read_str(&doc, &obj, "password_hash")?;
        match (uid, password_hash) {
            (Some(uid), Some(password_hash)) => Ok(Some(Account { uid, password_hash })),
            _ => {
                warn!(email, "account record is incomplete");
                Ok(None)
            }
        }
    }
}

fn read_str(doc: &AutoCommit, obj: &ObjId, key: &str) -> Result<Option<String>, AuthError> {
    match doc.get(obj, key).map_err(network)? {
        Some((Value::Scalar(s), _)) => match &*s {
            ScalarValue::Str(s) => Ok(Some(s.to_string())),
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

fn network(e: impl std::fmt::Display) -> AuthError {
    AuthError::Network(e.to_string())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Network(format!("password hashing failed: {}", e)))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn create_identity(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email)?;
        validate_password(password)?;

        self.inner.refresh()?;
        if self.inner.find_account(&email)?.is_some() {
            return Err(AuthError::DuplicateAccount);
        }
        let password_hash = hash_password(password)?;
        let uid = Uuid::new_v4().to_string();

        {
            let mut doc = self.inner.lock()?;
            let snapshot = doc.clone();
            if let Err(e) = self.inner.insert_account(&mut doc, &email, &uid, &password_hash) {
                *doc = snapshot;
                return Err(e);
            }
        }

        info!(uid = %uid, "identity created");
        Ok(Identity { uid, email })
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email)?;
        self.inner.refresh()?;

        let Some(account) = self.inner.find_account(&email)? else {
            debug!("sign-in for unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        verify_password(password, &account.password_hash)?;

        info!(uid = %account.uid, "identity authenticated");
        Ok(Identity {
            uid: account.uid,
            email,
        })
    }
}
