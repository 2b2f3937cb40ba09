//! Error taxonomy shared by every component.

use crate::validate::FieldErrors;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between a UI event and its outcome.
///
/// None of these are fatal: the caller can always retry the action that
/// produced them. Only [`Error::SessionExpired`] carries a side effect, and
/// that side effect (clearing the session) has already happened by the time
/// the caller sees it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed input, reported per field.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The referenced task or user does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record that was looked up (`"task"`, `"user"`).
        entity: &'static str,
        /// The identifier that missed.
        id: String,
    },

    /// The request collides with existing state (e.g. duplicate email).
    #[error("{0}")]
    Conflict(String),

    /// Login was rejected.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// An authenticated call was rejected; the session has been cleared.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// A response arrived but its body could not be interpreted.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Any other non-success status from the remote API.
    #[error("server returned {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the body, or the raw body.
        message: String,
    },

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Local state could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Shorthand for a missing task.
    #[must_use]
    pub fn task_not_found(id: u64) -> Self {
        Self::NotFound { entity: "task", id: id.to_string() }
    }

    /// Shorthand for a single-field validation failure.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(Error::task_not_found(7).to_string(), "task 7 not found");
        assert_eq!(Error::InvalidCredentials.to_string(), "invalid email or password");
        assert_eq!(
            Error::Server { status: 500, message: "boom".into() }.to_string(),
            "server returned 500: boom"
        );
    }

    #[test]
    fn single_field_validation_names_the_field() {
        let err = Error::invalid("title", "Title is required");
        assert_eq!(err.to_string(), "validation failed: title: Title is required");
    }

    #[test]
    fn json_errors_become_malformed_responses() {
        let err: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }
}
