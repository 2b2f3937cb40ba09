//! Account service backed by the remote auth endpoints.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gateway::{check_status, decode_json, error_message, ApiRequest, Gateway};
use crate::ports::{AccountService, HttpResponse, PortFuture};
use crate::session::{Registration, Session, User, UserId};

/// Body shared by every `/api/auth` response. Which fields are present
/// depends on the endpoint.
#[derive(Debug, Deserialize)]
struct AuthPayload {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    id: Option<UserId>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

impl AuthPayload {
    fn into_user(self) -> Result<(Option<String>, User)> {
        match (self.id, self.name, self.email) {
            (Some(id), Some(name), Some(email)) => Ok((
                self.token,
                User { id, name, email, role: self.role.unwrap_or_default().to_lowercase() },
            )),
            _ => Err(Error::MalformedResponse("auth response is missing user fields".into())),
        }
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Remote strategy for [`AccountService`].
///
/// Login and registration are anonymous calls; only `profile` carries the
/// bearer token. Roles are lower-cased to match the demo accounts.
pub struct RemoteAccounts {
    gateway: Arc<Gateway>,
}

impl RemoteAccounts {
    /// Accounts reached through `gateway`.
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let request = ApiRequest::post("/api/auth/login", &Credentials { email, password })?;
        let response = self.gateway.call_anonymous(request).await?;
        if matches!(response.status, 400 | 401) {
            return Err(Error::InvalidCredentials);
        }
        let response = check_status(response, || auth_endpoint_missing("login"))?;
        let (token, user) = decode_json::<AuthPayload>(&response)?.into_user()?;
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::MalformedResponse("login response has no token".into()))?;
        Ok(Session { token, user })
    }

    async fn sign_up(&self, registration: Registration) -> Result<User> {
        let request = ApiRequest::post("/api/auth/register", &registration)?;
        let response = self.gateway.call_anonymous(request).await?;
        if is_duplicate_email(&response) {
            return Err(Error::Conflict(error_message(&response)));
        }
        let response = check_status(response, || auth_endpoint_missing("register"))?;
        // Older servers answer with a bare confirmation message.
        let payload = decode_json::<AuthPayload>(&response)?;
        Ok(User {
            id: payload.id.unwrap_or_default(),
            name: payload.name.unwrap_or_else(|| registration.name.trim().to_string()),
            email: payload.email.unwrap_or_else(|| registration.email.trim().to_string()),
            role: payload.role.unwrap_or_else(|| "user".to_string()).to_lowercase(),
        })
    }

    async fn fetch_profile(&self) -> Result<User> {
        let response = self.gateway.call(ApiRequest::get("/api/auth/profile")).await?;
        let response = check_status(response, || auth_endpoint_missing("profile"))?;
        let (_, user) = decode_json::<AuthPayload>(&response)?.into_user()?;
        Ok(user)
    }
}

fn auth_endpoint_missing(name: &str) -> Error {
    Error::Server { status: 404, message: format!("auth endpoint {name} not available") }
}

fn is_duplicate_email(response: &HttpResponse) -> bool {
    match response.status {
        409 => true,
        400 => {
            let message = error_message(response).to_lowercase();
            message.contains("already registered") || message.contains("already exists")
        }
        _ => false,
    }
}

impl AccountService for RemoteAccounts {
    fn login(&self, email: &str, password: &str) -> PortFuture<'_, Session> {
        let (email, password) = (email.to_string(), password.to_string());
        Box::pin(async move { self.sign_in(&email, &password).await })
    }

    fn register(&self, registration: Registration) -> PortFuture<'_, User> {
        Box::pin(self.sign_up(registration))
    }

    fn profile(&self) -> PortFuture<'_, User> {
        Box::pin(self.fetch_profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::ScriptedTransport;
    use crate::session::SessionCell;
    use serde_json::json;

    fn accounts(
        responses: Vec<HttpResponse>,
    ) -> (RemoteAccounts, Arc<ScriptedTransport>, Arc<SessionCell>) {
        let transport = Arc::new(ScriptedTransport::new(responses));
        let cell = Arc::new(SessionCell::in_memory());
        let gateway = Gateway::new(transport.clone(), Arc::clone(&cell), "http://api");
        (RemoteAccounts::new(Arc::new(gateway)), transport, cell)
    }

    fn registration() -> Registration {
        Registration { name: "Dup".into(), email: "dup@x.com".into(), password: "secret1".into() }
    }

    #[tokio::test]
    async fn login_returns_token_and_profile() {
        let (accounts, transport, _) = accounts(vec![HttpResponse::new(
            200,
            r#"{"token":"jwt-1","type":"Bearer","id":4,"name":"Ada","email":"ada@x.com","role":"ADMIN"}"#,
        )]);
        let session = accounts.login("ada@x.com", "pw1234").await.unwrap();
        assert_eq!(session.token, "jwt-1");
        assert_eq!(session.user.role, "admin");

        let sent = transport.sent();
        assert_eq!(sent[0].body, Some(json!({"email": "ada@x.com", "password": "pw1234"})));
        assert_eq!(sent[0].header("Authorization"), None);
    }

    #[tokio::test]
    async fn rejected_login_is_invalid_credentials() {
        let (accounts, _, _) = accounts(vec![
            HttpResponse::new(400, r#"{"message":"Invalid email or password"}"#),
            HttpResponse::new(401, ""),
        ]);
        for _ in 0..2 {
            let err = accounts.login("bad@x.com", "wrong").await.unwrap_err();
            assert!(matches!(err, Error::InvalidCredentials));
        }
    }

    #[tokio::test]
    async fn login_without_token_is_malformed() {
        let (accounts, _, _) =
            accounts(vec![HttpResponse::new(200, r#"{"id":1,"name":"A","email":"a@x.com"}"#)]);
        let err = accounts.login("a@x.com", "pw1234").await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let (accounts, _, _) = accounts(vec![
            HttpResponse::new(
                400,
                r#"{"message":"Registration failed: Email already registered: dup@x.com"}"#,
            ),
            HttpResponse::new(409, r#"{"message":"exists"}"#),
        ]);
        assert!(matches!(accounts.register(registration()).await, Err(Error::Conflict(_))));
        assert!(matches!(accounts.register(registration()).await, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn other_bad_requests_are_validation_errors() {
        let (accounts, _, _) =
            accounts(vec![HttpResponse::new(400, r#"{"errors":{"password":"too short"}}"#)]);
        assert!(matches!(accounts.register(registration()).await, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn message_only_registration_falls_back_to_submitted_fields() {
        let (accounts, _, _) = accounts(vec![HttpResponse::new(
            200,
            r#"{"type":"Bearer","message":"User registered successfully. You can now login."}"#,
        )]);
        let user = accounts.register(registration()).await.unwrap();
        assert_eq!(user.email, "dup@x.com");
        assert_eq!(user.role, "user");
    }

    #[tokio::test]
    async fn html_registration_response_is_malformed() {
        let (accounts, _, _) = accounts(vec![HttpResponse::new(
            200,
            "<!DOCTYPE html><html><body>Welcome</body></html>",
        )]);
        let err = accounts.register(registration()).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn rejected_profile_clears_session() {
        let (accounts, transport, cell) = accounts(vec![HttpResponse::new(401, "")]);
        cell.set(Session {
            token: "old".into(),
            user: User { id: 1, name: "A".into(), email: "a@x.com".into(), role: "user".into() },
        });
        assert!(matches!(accounts.profile().await, Err(Error::SessionExpired)));
        assert!(!cell.is_authenticated());
        assert_eq!(transport.sent()[0].header("Authorization"), Some("Bearer old"));
    }
}
