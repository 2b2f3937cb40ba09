//! Cassette data structures for recording and replaying HTTP exchanges.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ports::Method;

/// One request/response pair seen by the transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exchange {
    /// Sequence number (assigned automatically by the recorder).
    pub seq: u64,
    /// HTTP method.
    pub method: Method,
    /// Path and query, without scheme or host.
    pub path: String,
    /// JSON body sent, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<serde_json::Value>,
    /// Response status code.
    pub status: u16,
    /// Raw response body.
    #[serde(default)]
    pub body: String,
}

/// A named, ordered list of exchanges against one backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name for this cassette.
    pub name: String,
    /// When this cassette was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Base URL the exchanges were made against.
    pub base_url: String,
    /// Exchanges in the order they happened.
    pub exchanges: Vec<Exchange>,
}

impl Cassette {
    /// Reads and parses a cassette file.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Storage(format!("failed to read cassette {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            Error::Storage(format!("failed to parse cassette {}: {e}", path.display()))
        })
    }
}

/// Strips scheme and host from `url`, leaving the path and query.
#[must_use]
pub fn path_of(url: &str) -> &str {
    let after_scheme = url.find("://").map_or(url, |idx| &url[idx + 3..]);
    after_scheme.find('/').map_or("/", |idx| &after_scheme[idx..])
}
