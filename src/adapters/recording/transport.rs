//! Recording adapter for the `HttpTransport` port.

use std::sync::{Arc, Mutex, PoisonError};

use crate::cassette::CassetteRecorder;
use crate::ports::{HttpRequest, HttpResponse, HttpTransport, PortFuture};

/// Records every exchange while delegating to an inner transport.
///
/// Requests that never produced a response are not recorded.
pub struct RecordingTransport {
    inner: Arc<dyn HttpTransport>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingTransport {
    /// Creates a recording transport wrapping `inner`.
    pub fn new(inner: Arc<dyn HttpTransport>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl HttpTransport for RecordingTransport {
    fn send(&self, request: HttpRequest) -> PortFuture<'_, HttpResponse> {
        let recorded = request.clone();
        Box::pin(async move {
            let response = self.inner.send(request).await?;
            self.recorder
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .record(&recorded, &response);
            Ok(response)
        })
    }
}
