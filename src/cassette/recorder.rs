//! Records exchanges into a cassette file.

use std::path::PathBuf;

use chrono::Utc;

use super::format::{Cassette, Exchange};
use crate::error::Result;
use crate::ports::{HttpRequest, HttpResponse};

/// Collects exchanges and writes them as a YAML cassette file.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    base_url: String,
    exchanges: Vec<Exchange>,
    next_seq: u64,
}

impl CassetteRecorder {
    /// Create a new recorder that will write to the given path.
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            base_url: base_url.into(),
            exchanges: Vec::new(),
            next_seq: 0,
        }
    }

    /// Record one exchange. The `seq` field is assigned automatically.
    pub fn record(&mut self, request: &HttpRequest, response: &HttpResponse) {
        self.exchanges.push(Exchange {
            seq: self.next_seq,
            method: request.method,
            path: super::path_of(&request.url).to_string(),
            request_body: request.body.clone(),
            status: response.status,
            body: response.body.clone(),
        });
        self.next_seq += 1;
    }

    /// Number of exchanges recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// Returns `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Write the cassette YAML file, creating its directory if needed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be written.
    pub fn save(&self) -> Result<PathBuf> {
        let cassette = Cassette {
            name: self.name.clone(),
            recorded_at: Utc::now(),
            base_url: self.base_url.clone(),
            exchanges: self.exchanges.clone(),
        };
        let yaml = serde_yaml::to_string(&cassette)
            .map_err(|e| crate::error::Error::Storage(format!("failed to encode cassette: {e}")))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, yaml)?;
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::Method;
    use serde_json::json;

    fn request(method: Method, url: &str) -> HttpRequest {
        HttpRequest { method, url: url.into(), headers: Vec::new(), body: None }
    }

    #[test]
    fn record_and_save() {
        let dir = std::env::temp_dir().join("taskdeck_cassette_recorder_test");
        let path = dir.join("nested").join("session.cassette.yaml");

        let mut recorder = CassetteRecorder::new(&path, "test-recording", "http://api");
        let mut create = request(Method::Post, "http://api/api/tasks");
        create.body = Some(json!({"title": "A"}));
        recorder.record(&create, &HttpResponse::new(201, r#"{"id":1}"#));
        recorder.record(
            &request(Method::Get, "http://api/api/tasks"),
            &HttpResponse::new(200, "[]"),
        );
        recorder.record(
            &request(Method::Delete, "http://api/api/tasks/1"),
            &HttpResponse::new(204, ""),
        );
        assert_eq!(recorder.len(), 3);

        let written = recorder.save().expect("save should succeed");
        assert_eq!(written, path);

        let cassette = Cassette::load(&path).unwrap();
        assert_eq!(cassette.name, "test-recording");
        assert_eq!(cassette.base_url, "http://api");
        let seqs: Vec<_> = cassette.exchanges.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(cassette.exchanges[0].path, "/api/tasks");
        assert_eq!(cassette.exchanges[0].request_body, Some(json!({"title": "A"})));
        assert_eq!(cassette.exchanges[2].status, 204);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
