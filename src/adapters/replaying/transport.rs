//! Replaying adapter for the `HttpTransport` port.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::cassette::{path_of, Cassette, CassetteReplayer};
use crate::error::Result;
use crate::ports::{HttpRequest, HttpResponse, HttpTransport, PortFuture};

/// Serves recorded responses from a cassette instead of the network.
///
/// Requests are matched on method and path only; headers and bodies are
/// not compared.
pub struct ReplayingTransport {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingTransport {
    /// Create a replaying transport over a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        Self { replayer: Mutex::new(CassetteReplayer::new(cassette)) }
    }

    /// Load the cassette at `path` and replay it.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the cassette cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(&Cassette::load(path)?))
    }

    /// Exchanges not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.replayer.lock().unwrap_or_else(PoisonError::into_inner).remaining()
    }
}

impl HttpTransport for ReplayingTransport {
    fn send(&self, request: HttpRequest) -> PortFuture<'_, HttpResponse> {
        let path = path_of(&request.url);
        let result = self
            .replayer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_exchange(request.method, path)
            .map(|exchange| {
                debug!(
                    seq = exchange.seq,
                    method = %exchange.method,
                    path = %exchange.path,
                    "replaying exchange"
                );
                HttpResponse::new(exchange.status, exchange.body)
            });
        Box::pin(async move { result })
    }
}
