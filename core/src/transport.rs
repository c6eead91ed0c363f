//! Pluggable transport for executing an `ApiRequest`.
//!
//! Any HTTP library can sit behind `Transport`; the orchestrator only needs
//! the status, the status text and a body it can decode later. With the
//! `reqwest-client` feature (on by default) a reqwest-backed implementation
//! is provided.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::http::{ApiRequest, ApiResponse};

/// Sends one request and hands back the raw response.
///
/// Implementations must return non-2xx responses as `Ok`; status
/// classification belongs to the orchestrator. `Err` is reserved for
/// failures where no response was obtained.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, req: ApiRequest) -> Result<ApiResponse, ApiError>;
}

#[cfg(feature = "reqwest-client")]
pub use self::reqwest_impl::ReqwestTransport;

#[cfg(feature = "reqwest-client")]
mod reqwest_impl {
    use async_trait::async_trait;
    use serde_json::Value;

    use crate::error::ApiError;
    use crate::http::{ApiRequest, ApiResponse, ResponseBody};

    use super::Transport;

    /// Transport backed by a `reqwest::Client`.
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Use a preconfigured client (proxies, TLS roots, ...).
        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    /// Unread reqwest response body.
    struct ReqwestBody(reqwest::Response);

    #[async_trait]
    impl ResponseBody for ReqwestBody {
        async fn json(self: Box<Self>) -> Result<Value, ApiError> {
            let ReqwestBody(response) = *self;
            let text = response
                .text()
                .await
                .map_err(|e| ApiError::Transport(format!("failed to read response body: {e}")))?;
            serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn fetch(&self, req: ApiRequest) -> Result<ApiResponse, ApiError> {
            let method = reqwest::Method::from_bytes(req.method.as_str().as_bytes())
                .map_err(|e| ApiError::InvalidRequest(format!("invalid method {}: {e}", req.method)))?;

            let mut builder = self.client.request(method, &req.url);
            for (key, value) in &req.headers {
                builder = builder.header(key, value);
            }
            if let Some(body) = req.body {
                builder = builder.body(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| ApiError::Transport(format!("{} {} failed: {e}", req.method, req.url)))?;

            let status = response.status();
            Ok(ApiResponse::new(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
                ReqwestBody(response),
            ))
        }
    }
}
