//! Demo user table.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use super::{seed_users, DemoUser, DEMO_TOKEN_PREFIX};
use crate::error::{Error, Result};
use crate::ports::{AccountService, IdGenerator, PortFuture};
use crate::session::{Registration, Session, SessionCell, User};

/// Accounts held in memory, with plain-text passwords.
///
/// Tokens are `demo-jwt-token-` followed by a generated id. The table does
/// not remember which tokens it issued; `profile` trusts any token carrying
/// the demo prefix and looks the user up from the session.
pub struct DemoAccounts {
    users: Mutex<Vec<DemoUser>>,
    ids: Arc<dyn IdGenerator>,
    session: Arc<SessionCell>,
}

impl DemoAccounts {
    /// A table holding `users`.
    pub fn new(users: Vec<DemoUser>, ids: Arc<dyn IdGenerator>, session: Arc<SessionCell>) -> Self {
        Self { users: Mutex::new(users), ids, session }
    }

    /// A table holding the two demo accounts.
    pub fn seeded(ids: Arc<dyn IdGenerator>, session: Arc<SessionCell>) -> Self {
        Self::new(seed_users(), ids, session)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<DemoUser>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current accounts, including ones registered during this process.
    #[must_use]
    pub fn snapshot(&self) -> Vec<DemoUser> {
        self.lock().clone()
    }

    /// Replaces the table. An empty list keeps the current accounts.
    pub fn restore(&self, users: Vec<DemoUser>) {
        if !users.is_empty() {
            *self.lock() = users;
        }
    }

    fn authenticate(&self, email: &str, password: &str) -> Result<Session> {
        let users = self.lock();
        let account = users
            .iter()
            .find(|u| u.user.email.eq_ignore_ascii_case(email) && u.password == password)
            .ok_or(Error::InvalidCredentials)?;
        Ok(Session {
            token: format!("{DEMO_TOKEN_PREFIX}{}", self.ids.generate_id()),
            user: account.user.clone(),
        })
    }

    fn insert(&self, registration: Registration) -> Result<User> {
        let mut users = self.lock();
        let email = registration.email.trim();
        if users.iter().any(|u| u.user.email.eq_ignore_ascii_case(email)) {
            return Err(Error::Conflict(format!("email {email} is already registered")));
        }
        let id = users.iter().map(|u| u.user.id).max().unwrap_or(0) + 1;
        let user = User {
            id,
            name: registration.name.trim().to_string(),
            email: email.to_string(),
            role: "user".to_string(),
        };
        users.push(DemoUser { user: user.clone(), password: registration.password });
        Ok(user)
    }

    fn current(&self) -> Result<User> {
        let session = self.session.snapshot();
        let Some(session) = session.filter(|s| s.token.starts_with(DEMO_TOKEN_PREFIX)) else {
            warn!("demo profile requested without a demo token");
            self.session.clear();
            return Err(Error::SessionExpired);
        };
        self.lock()
            .iter()
            .find(|u| u.user.id == session.user.id)
            .map(|u| u.user.clone())
            .ok_or_else(|| Error::NotFound { entity: "user", id: session.user.id.to_string() })
    }
}

impl AccountService for DemoAccounts {
    fn login(&self, email: &str, password: &str) -> PortFuture<'_, Session> {
        let result = self.authenticate(email, password);
        Box::pin(async move { result })
    }

    fn register(&self, registration: Registration) -> PortFuture<'_, User> {
        let result = self.insert(registration);
        if let Ok(user) = &result {
            info!(user_id = user.id, "demo account created");
        }
        Box::pin(async move { result })
    }

    fn profile(&self) -> PortFuture<'_, User> {
        let result = self.current();
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::SequentialIdGenerator;

    fn accounts() -> (DemoAccounts, Arc<SessionCell>) {
        let cell = Arc::new(SessionCell::in_memory());
        let accounts =
            DemoAccounts::seeded(Arc::new(SequentialIdGenerator::new()), Arc::clone(&cell));
        (accounts, cell)
    }

    fn registration(email: &str) -> Registration {
        Registration { name: "New".into(), email: email.into(), password: "secret1".into() }
    }

    #[tokio::test]
    async fn login_issues_prefixed_tokens() {
        let (accounts, _) = accounts();
        let first = accounts.login("demo@example.com", "demo123").await.unwrap();
        let second = accounts.login("DEMO@example.com", "demo123").await.unwrap();
        assert_eq!(first.token, "demo-jwt-token-1");
        assert_eq!(second.token, "demo-jwt-token-2");
        assert_eq!(first.user.role, "admin");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let (accounts, _) = accounts();
        let err = accounts.login("demo@example.com", "demo124").await.unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn registration_conflicts_ignore_case() {
        let (accounts, _) = accounts();
        let user = accounts.register(registration("new@example.com")).await.unwrap();
        assert_eq!(user.id, 3);
        let err = accounts.register(registration("NEW@example.com")).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(accounts.snapshot().len(), 3);
    }

    #[tokio::test]
    async fn profile_without_demo_token_expires_session() {
        let (accounts, cell) = accounts();
        cell.set(Session { token: "forged".into(), user: seed_users()[0].user.clone() });
        let err = accounts.profile().await.unwrap_err();
        assert!(matches!(err, Error::SessionExpired));
        assert!(!cell.is_authenticated());
    }

    #[tokio::test]
    async fn profile_follows_session_user() {
        let (accounts, cell) = accounts();
        let session = accounts.login("test@example.com", "test123").await.unwrap();
        cell.set(session);
        assert_eq!(accounts.profile().await.unwrap().name, "Test User");
    }

    #[test]
    fn restore_ignores_empty_tables() {
        let (accounts, _) = accounts();
        accounts.restore(Vec::new());
        assert_eq!(accounts.snapshot(), seed_users());
    }
}
