//! Session-aware request gateway.
//!
//! Every call that leaves the process goes through [`Gateway`]. Authenticated
//! calls carry the bearer token from the shared [`SessionCell`] and treat a
//! 401 as the end of the session. Anonymous calls (login, registration) do
//! neither.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::ports::{HttpRequest, HttpResponse, HttpTransport, Method};
use crate::session::SessionCell;
use crate::validate::{FieldError, FieldErrors};

/// A request relative to the gateway's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Verb.
    pub method: Method,
    /// Path starting with `/`, including any query string.
    pub path: String,
    /// JSON body.
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None }
    }

    /// `GET path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// `DELETE path`.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// `PATCH path` without a body.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    /// `POST path` with `body` encoded as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be encoded.
    pub fn post(path: impl Into<String>, body: &impl Serialize) -> Result<Self> {
        Self::new(Method::Post, path).with_body(body)
    }

    /// `PUT path` with `body` encoded as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be encoded.
    pub fn put(path: impl Into<String>, body: &impl Serialize) -> Result<Self> {
        Self::new(Method::Put, path).with_body(body)
    }

    fn with_body(mut self, body: &impl Serialize) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// Sends [`ApiRequest`]s to one backend on behalf of the current session.
pub struct Gateway {
    transport: Arc<dyn HttpTransport>,
    session: Arc<SessionCell>,
    base_url: String,
}

impl Gateway {
    /// A gateway for `base_url`; a trailing `/` is dropped.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        session: Arc<SessionCell>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { transport, session, base_url }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session this gateway authenticates with.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionCell> {
        &self.session
    }

    fn resolve(&self, request: ApiRequest) -> HttpRequest {
        HttpRequest {
            method: request.method,
            url: format!("{}{}", self.base_url, request.path),
            headers: vec![("Accept".to_string(), "application/json".to_string())],
            body: request.body,
        }
    }

    /// Sends an authenticated request.
    ///
    /// The bearer token is attached when a session exists. Any status other
    /// than 401 is returned as-is for the caller to interpret.
    ///
    /// # Errors
    ///
    /// Returns `SessionExpired` on a 401, after clearing the session, or a
    /// network error when no response arrived.
    pub async fn call(&self, request: ApiRequest) -> Result<HttpResponse> {
        let mut outbound = self.resolve(request);
        if let Some(token) = self.session.token() {
            outbound.headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        let method = outbound.method;
        let url = outbound.url.clone();
        let response = self.transport.send(outbound).await?;
        if response.status == 401 {
            warn!(%method, %url, "authorization rejected, clearing session");
            self.session.clear();
            return Err(Error::SessionExpired);
        }
        debug!(%method, %url, status = response.status, "authenticated call finished");
        Ok(response)
    }

    /// Sends a request without credentials. A 401 is returned like any
    /// other status and the session is left alone.
    ///
    /// # Errors
    ///
    /// Returns a network error when no response arrived.
    pub async fn call_anonymous(&self, request: ApiRequest) -> Result<HttpResponse> {
        let outbound = self.resolve(request);
        self.transport.send(outbound).await
    }
}

/// Decodes a JSON response body.
///
/// # Errors
///
/// Returns `MalformedResponse` for an empty body, an HTML page, or invalid
/// JSON.
pub fn decode_json<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    let body = response.body.trim();
    if body.is_empty() {
        return Err(Error::MalformedResponse("empty response from server".into()));
    }
    if body.starts_with('<') {
        return Err(Error::MalformedResponse("server returned HTML instead of JSON".into()));
    }
    serde_json::from_str(body).map_err(Into::into)
}

/// Best human-readable message in an error body: its `message` or `error`
/// field when the body is JSON, the body itself otherwise.
#[must_use]
pub fn error_message(response: &HttpResponse) -> String {
    let fallback = || {
        let body = response.body.trim();
        if body.is_empty() {
            format!("request failed with status {}", response.status)
        } else {
            body.to_string()
        }
    };
    serde_json::from_str::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|json| {
            ["message", "error"]
                .iter()
                .find_map(|key| json.get(key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(fallback)
}

/// Field errors reported by the server in a 400 body, if it sent any.
///
/// Accepts `{"errors": {"field": "message", ...}}` or a bare field map.
fn field_errors(response: &HttpResponse) -> Option<FieldErrors> {
    let json: serde_json::Value = serde_json::from_str(&response.body).ok()?;
    let map = json.get("errors").unwrap_or(&json).as_object()?;
    let errors: Vec<_> = map
        .iter()
        .filter(|(field, _)| {
            !matches!(field.as_str(), "message" | "error" | "status" | "timestamp" | "path")
        })
        .filter_map(|(field, message)| {
            message.as_str().map(|m| FieldError { field: field.clone(), message: m.to_string() })
        })
        .collect();
    (!errors.is_empty()).then_some(FieldErrors(errors))
}

/// Maps a non-success status to the error taxonomy.
///
/// `not_found` builds the error for a 404, since only the caller knows what
/// was looked up.
///
/// # Errors
///
/// 404 → the `not_found` error, 400 → `Validation`, other non-2xx → `Server`.
pub fn check_status(
    response: HttpResponse,
    not_found: impl FnOnce() -> Error,
) -> Result<HttpResponse> {
    match response.status {
        _ if response.is_success() => Ok(response),
        404 => Err(not_found()),
        400 => Err(Error::Validation(
            field_errors(&response)
                .unwrap_or_else(|| FieldErrors::single("request", error_message(&response))),
        )),
        status => Err(Error::Server { status, message: error_message(&response) }),
    }
}
