//! Deterministic in-process adapters.
//!
//! Used by tests and by [`AppContext::in_memory`](crate::context::AppContext::in_memory),
//! where wall-clock time, random ids and the real disk would make runs
//! unrepeatable.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

use crate::error::{Error, Result};
use crate::ports::{
    Clock, FileSystem, HttpRequest, HttpResponse, HttpTransport, IdGenerator, PortFuture,
};

/// A clock that only moves when told to.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// A clock frozen at `now`.
    #[must_use]
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Produces `1`, `2`, `3`, ... with an optional prefix.
#[derive(Default)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Unprefixed sequence starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence whose ids start with `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), next: AtomicU64::new(0) }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}{n}", self.prefix)
    }
}

/// Filesystem held in a map, for tests that must not touch disk.
#[derive(Default)]
pub struct MemoryFileSystem {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    /// An empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files
            .get(path)
            .cloned()
            .ok_or_else(|| Error::Storage(format!("file not found: {}", path.display())))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files.contains_key(path) || files.keys().any(|k| k.starts_with(path) && k != path)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner).remove(path);
        Ok(())
    }
}

/// Transport that answers from a fixed script and remembers what it was sent.
///
/// Responses are handed out in order regardless of the request. An empty
/// script fails like an unreachable host.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    /// A transport that will answer with `responses`, in order.
    pub fn new(responses: impl IntoIterator<Item = HttpResponse>) -> Self {
        Self { responses: Mutex::new(responses.into_iter().collect()), sent: Mutex::default() }
    }

    /// Every request sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl HttpTransport for ScriptedTransport {
    fn send(&self, request: HttpRequest) -> PortFuture<'_, HttpResponse> {
        let url = request.url.clone();
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).push(request);
        let next = self.responses.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
        Box::pin(async move {
            next.ok_or_else(|| Error::Network(format!("no scripted response for {url}")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_moves_only_on_request() {
        let start = Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap();
        let clock = FixedClock::at(start);
        assert_eq!(clock.now(), start);
        clock.advance(Duration::days(1));
        assert_eq!(clock.today(), start.date_naive().succ_opt().unwrap());
    }

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialIdGenerator::with_prefix("tok-");
        assert_eq!(ids.generate_id(), "tok-1");
        assert_eq!(ids.generate_id(), "tok-2");
    }

    #[tokio::test]
    async fn scripted_transport_answers_in_order() {
        use crate::ports::Method;
        let transport = ScriptedTransport::new([HttpResponse::new(200, "[]")]);
        let request = HttpRequest {
            method: Method::Get,
            url: "http://h/a".into(),
            headers: Vec::new(),
            body: None,
        };
        assert_eq!(transport.send(request.clone()).await.unwrap().body, "[]");
        assert!(matches!(transport.send(request).await, Err(Error::Network(_))));
        assert_eq!(transport.sent().len(), 2);
    }

    #[test]
    fn memory_fs_treats_parents_as_existing() {
        let fs = MemoryFileSystem::new();
        fs.write(Path::new("/state/a.json"), "1").unwrap();
        assert!(fs.exists(Path::new("/state")));
        fs.remove(Path::new("/state/a.json")).unwrap();
        assert!(!fs.exists(Path::new("/state/a.json")));
    }
}
