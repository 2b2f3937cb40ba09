//! Replays recorded exchanges from a cassette.

use std::collections::{HashMap, VecDeque};

use super::format::{Cassette, Exchange};
use crate::error::{Error, Result};
use crate::ports::Method;

/// Serves exchanges from a loaded cassette, in recorded order per
/// `METHOD path` pair.
pub struct CassetteReplayer {
    queues: HashMap<String, VecDeque<Exchange>>,
}

fn key(method: Method, path: &str) -> String {
    format!("{method} {path}")
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<String, VecDeque<Exchange>> = HashMap::new();
        for exchange in &cassette.exchanges {
            queues
                .entry(key(exchange.method, &exchange.path))
                .or_default()
                .push_back(exchange.clone());
        }
        Self { queues }
    }

    /// Return the next exchange recorded for `method path`.
    ///
    /// # Errors
    ///
    /// Returns a network error naming the request when the cassette has no
    /// (more) exchanges for it.
    pub fn next_exchange(&mut self, method: Method, path: &str) -> Result<Exchange> {
        let wanted = key(method, path);
        match self.queues.get_mut(&wanted) {
            Some(queue) => queue.pop_front().ok_or_else(|| {
                Error::Network(format!(
                    "cassette exhausted: every exchange for {wanted} was consumed"
                ))
            }),
            None => {
                let mut available: Vec<&str> = self.queues.keys().map(String::as_str).collect();
                available.sort_unstable();
                Err(Error::Network(format!(
                    "cassette has no exchange for {wanted}; recorded: [{}]",
                    available.join(", ")
                )))
            }
        }
    }

    /// Exchanges not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn exchange(seq: u64, method: Method, path: &str, body: &str) -> Exchange {
        Exchange {
            seq,
            method,
            path: path.into(),
            request_body: None,
            status: 200,
            body: body.into(),
        }
    }

    fn make_cassette(exchanges: Vec<Exchange>) -> Cassette {
        Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            base_url: "http://localhost:8080".into(),
            exchanges,
        }
    }

    #[test]
    fn serves_each_request_in_recorded_order() {
        let cassette = make_cassette(vec![
            exchange(0, Method::Get, "/api/tasks", "[]"),
            exchange(1, Method::Post, "/api/tasks", r#"{"id":1}"#),
            exchange(2, Method::Get, "/api/tasks", "[1]"),
        ]);
        let mut replayer = CassetteReplayer::new(&cassette);

        assert_eq!(replayer.next_exchange(Method::Get, "/api/tasks").unwrap().seq, 0);
        assert_eq!(replayer.next_exchange(Method::Post, "/api/tasks").unwrap().seq, 1);
        assert_eq!(replayer.next_exchange(Method::Get, "/api/tasks").unwrap().body, "[1]");
        assert_eq!(replayer.remaining(), 0);
    }

    #[test]
    fn exhausted_pair_is_a_network_error() {
        let cassette = make_cassette(vec![exchange(0, Method::Get, "/api/tasks", "[]")]);
        let mut replayer = CassetteReplayer::new(&cassette);
        replayer.next_exchange(Method::Get, "/api/tasks").unwrap();
        let err = replayer.next_exchange(Method::Get, "/api/tasks").unwrap_err();
        assert!(matches!(err, Error::Network(ref m) if m.contains("exhausted")));
    }

    #[test]
    fn unknown_request_lists_what_was_recorded() {
        let cassette = make_cassette(vec![exchange(0, Method::Get, "/api/tasks", "[]")]);
        let mut replayer = CassetteReplayer::new(&cassette);
        let err = replayer.next_exchange(Method::Delete, "/api/tasks/1").unwrap_err();
        assert!(err.to_string().contains("GET /api/tasks"));
    }
}
