//! # HTTP transport seam
//!
//! [`AuthGateway`](crate::AuthGateway) never talks to `reqwest` directly. It
//! builds an [`ApiRequest`] and hands it to an [`HttpTransport`], which returns
//! the status and body as a [`RawResponse`]. Non-2xx statuses are ordinary
//! responses; only failures to get any response at all are errors.
//!
//! | Implementation | Used by |
//! |----------------|---------|
//! | [`ReqwestTransport`] | Browser (`fetch` under wasm) and native builds |
//! | [`ScriptedTransport`](crate::testing::ScriptedTransport) | Tests (`test-util` feature) |

use std::future::Future;

use reqwest::header::CONTENT_TYPE;
pub use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::error::TransportError;

/// A fully-resolved request.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    /// Bearer credential for the `Authorization` header.
    pub bearer: Option<String>,
    /// JSON-encoded body.
    pub body: Option<String>,
}

/// Status and body of a completed request.
#[derive(Clone, Debug, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Human-readable error message from the body, see
    /// [`error_message`](crate::models::error_message).
    pub fn error_message(&self) -> String {
        crate::models::error_message(self.status, &self.body)
    }
}

/// Async trait for sending requests to the backend.
pub trait HttpTransport {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>>;
}

/// `reqwest`-backed transport. On wasm this goes through the browser's `fetch`.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self.client.request(request.method, request.url.as_str());
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}
