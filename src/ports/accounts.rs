//! Account backend port.

use super::PortFuture;
use crate::session::{Registration, Session, User};

/// Issues sessions and manages user accounts.
///
/// Implemented by the demo user table and by the remote auth endpoints.
/// Implementations never touch the local session themselves except for
/// `profile`, which is an authenticated call and may clear it on
/// authorization failure.
pub trait AccountService: Send + Sync {
    /// Exchanges credentials for a bearer token and profile.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` when the pair is rejected, or a network
    /// error when the backend is unreachable.
    fn login(&self, email: &str, password: &str) -> PortFuture<'_, Session>;

    /// Creates an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when the email is taken, or a validation error for
    /// input the backend rejects.
    fn register(&self, registration: Registration) -> PortFuture<'_, User>;

    /// Profile of the currently authenticated user.
    ///
    /// # Errors
    ///
    /// Returns `SessionExpired` when the stored token is rejected.
    fn profile(&self) -> PortFuture<'_, User>;
}
