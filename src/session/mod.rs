//! Session store: the authenticated identity and bearer credential.
//!
//! [`SessionCell`] is the shared slot that the store and the gateway both
//! hold. Token and user live in one `Option<Session>`, so they are always
//! set and cleared together. [`SessionStore`] layers login, registration
//! and logout on top of it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::ports::{AccountService, FileSystem};
use crate::validate;

/// Numeric user identifier.
pub type UserId = u64;

/// A user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Role name (`admin`, `user`, ...).
    pub role: String,
}

/// Bearer token plus the profile it belongs to.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token.
    pub token: String,
    /// Profile of the token's owner.
    pub user: User,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &"[hidden]").field("user", &self.user).finish()
    }
}

/// Fields sent upstream to create an account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Chosen password.
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[hidden]")
            .finish()
    }
}

struct SessionFile {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

/// Shared, optionally persisted session slot.
///
/// When backed by a file, the file mirrors the slot: written on `set`,
/// removed on `clear`. A write failure is logged and the in-memory session
/// stays valid for the rest of the process.
pub struct SessionCell {
    slot: Mutex<Option<Session>>,
    file: Option<SessionFile>,
}

impl SessionCell {
    /// A slot that lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self { slot: Mutex::new(None), file: None }
    }

    /// A slot mirrored to `path`, restored from it if present.
    ///
    /// An unreadable or corrupt file is discarded and the slot starts empty.
    #[must_use]
    pub fn persisted(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let restored = Self::restore(fs.as_ref(), &path);
        Self { slot: Mutex::new(restored), file: Some(SessionFile { fs, path }) }
    }

    fn restore(fs: &dyn FileSystem, path: &Path) -> Option<Session> {
        if !fs.exists(path) {
            return None;
        }
        let parsed = fs
            .read_to_string(path)
            .and_then(|raw| serde_json::from_str::<Session>(&raw).map_err(Into::into));
        match parsed {
            Ok(session) => Some(session),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "discarding unreadable session file");
                if let Err(err) = fs.remove(path) {
                    warn!(error = %err, "failed to remove session file");
                }
                None
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `session`, replacing any previous one.
    pub fn set(&self, session: Session) {
        if let Some(file) = &self.file {
            match serde_json::to_string_pretty(&session) {
                Ok(json) => {
                    if let Err(err) = file.fs.write(&file.path, &json) {
                        warn!(error = %err, "failed to persist session");
                    }
                }
                Err(err) => warn!(error = %err, "failed to serialize session"),
            }
        }
        *self.lock() = Some(session);
    }

    /// Drops the session. Idempotent.
    pub fn clear(&self) {
        let had_session = self.lock().take().is_some();
        if let Some(file) = &self.file {
            if let Err(err) = file.fs.remove(&file.path) {
                warn!(error = %err, "failed to remove session file");
            }
        }
        if had_session {
            info!("session cleared");
        }
    }

    /// Replaces the stored profile, keeping the token. No-op without a session.
    pub fn replace_user(&self, user: User) {
        let updated = {
            let mut slot = self.lock();
            match slot.as_mut() {
                Some(session) => {
                    session.user = user;
                    Some(session.clone())
                }
                None => None,
            }
        };
        if let Some(session) = updated {
            self.set(session);
        }
    }

    /// A copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Option<Session> {
        self.lock().clone()
    }

    /// The bearer token, if authenticated.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock().as_ref().map(|s| s.token.clone())
    }

    /// The profile, if authenticated.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.lock().as_ref().map(|s| s.user.clone())
    }

    /// `true` iff a token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().is_some()
    }
}

impl Default for SessionCell {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Login, registration and logout over a shared [`SessionCell`].
pub struct SessionStore {
    cell: Arc<SessionCell>,
    accounts: Arc<dyn AccountService>,
}

impl SessionStore {
    /// Creates a store over `cell`, authenticating against `accounts`.
    pub fn new(cell: Arc<SessionCell>, accounts: Arc<dyn AccountService>) -> Self {
        Self { cell, accounts }
    }

    /// Logs in and stores the resulting session.
    ///
    /// On any failure the existing session, if there is one, is left as it
    /// was.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input, `InvalidCredentials`
    /// when rejected, or a network error.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim();
        validate::check_credentials(email, password)?;
        let session = self.accounts.login(email, password).await?;
        info!(user_id = session.user.id, "logged in");
        self.cell.set(session.clone());
        Ok(session)
    }

    /// Creates an account. The caller logs in separately.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input or `Conflict` for a
    /// taken email.
    #[tracing::instrument(skip(self))]
    pub async fn register(&self, registration: Registration) -> Result<User> {
        validate::check_registration(&registration)?;
        let user = self.accounts.register(registration).await?;
        info!(user_id = user.id, "registered");
        Ok(user)
    }

    /// Forgets the session. Safe to call when already logged out.
    pub fn logout(&self) {
        self.cell.clear();
    }

    /// Re-reads the profile from the backend and stores it.
    ///
    /// # Errors
    ///
    /// Returns `SessionExpired` (with the session cleared) when the token is
    /// rejected.
    pub async fn refresh_profile(&self) -> Result<User> {
        let user = self.accounts.profile().await?;
        self.cell.replace_user(user.clone());
        Ok(user)
    }

    /// `true` iff a token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.cell.is_authenticated()
    }

    /// The logged-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.cell.user()
    }

    /// The bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.cell.token()
    }

    /// The underlying slot.
    #[must_use]
    pub fn cell(&self) -> &Arc<SessionCell> {
        &self.cell
    }
}
