//! Live HTTP transport using `reqwest`.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::error::{Error, Result};
use crate::ports::{HttpRequest, HttpResponse, HttpTransport, Method, PortFuture};

/// Sends requests over the network.
pub struct LiveTransport {
    client: Client,
}

impl LiveTransport {
    /// Creates a transport whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

impl HttpTransport for LiveTransport {
    fn send(&self, request: HttpRequest) -> PortFuture<'_, HttpResponse> {
        Box::pin(async move {
            debug!(method = %request.method, url = %request.url, "sending request");

            let mut builder = self.client.request(to_reqwest(request.method), &request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(|e| {
                Error::Network(format!("{} {} failed: {e}", request.method, request.url))
            })?;
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| Error::Network(format!("failed to read response body: {e}")))?;

            debug!(status, bytes = body.len(), "received response");
            Ok(HttpResponse { status, body })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let transport = LiveTransport::new(Duration::from_secs(2)).unwrap();
        let err = transport
            .send(HttpRequest {
                method: Method::Get,
                url: "http://127.0.0.1:9/api/health".into(),
                headers: Vec::new(),
                body: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }
}
