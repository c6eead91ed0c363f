//! HTTP data types exchanged with a transport.
//!
//! # Design
//! Requests and responses are described as plain data. The orchestrator
//! builds an `ApiRequest`, hands it to a `Transport`, and receives an
//! `ApiResponse` back. The response body sits behind `ResponseBody` so it is
//! only decoded when the orchestrator asks for it: 5xx responses are
//! classified without ever touching the body.
//!
//! All fields use owned types (`String`, `Vec`) so values are `Send` and can
//! be moved into any transport.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;

/// HTTP method for a request. Parsing is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    /// Any other verb, stored upper-cased.
    Other(String),
}

impl HttpMethod {
    pub fn parse(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            "HEAD" => HttpMethod::Head,
            "OPTIONS" => HttpMethod::Options,
            other => HttpMethod::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Other(verb) => verb,
        }
    }

    pub fn is_get(&self) -> bool {
        *self == HttpMethod::Get
    }
}

impl From<&str> for HttpMethod {
    fn from(method: &str) -> Self {
        HttpMethod::parse(method)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully assembled outbound request.
///
/// Built by the orchestrator for a single call and never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ApiRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Deferred access to a response body.
#[async_trait]
pub trait ResponseBody: Send {
    /// Read and decode the body as JSON. Consumes the body.
    async fn json(self: Box<Self>) -> Result<Value, ApiError>;
}

/// A body that has already been read into memory.
#[derive(Debug, Clone, Default)]
pub struct BufferedBody(pub String);

#[async_trait]
impl ResponseBody for BufferedBody {
    async fn json(self: Box<Self>) -> Result<Value, ApiError> {
        serde_json::from_str(&self.0).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// The response a transport hands back for one request.
pub struct ApiResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Box<dyn ResponseBody>,
}

impl ApiResponse {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl ResponseBody + 'static) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: Box::new(body),
        }
    }

    /// Convenience constructor for an in-memory body.
    pub fn buffered(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(status, status_text, BufferedBody(body.into()))
    }

    /// `status / 100`, e.g. `4` for 404.
    pub fn status_class(&self) -> u16 {
        self.status / 100
    }

    pub async fn json(self) -> Result<Value, ApiError> {
        self.body.json().await
    }
}

impl fmt::Debug for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiResponse")
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_parsing_is_case_insensitive() {
        assert_eq!(HttpMethod::parse("get"), HttpMethod::Get);
        assert_eq!(HttpMethod::parse("Post"), HttpMethod::Post);
        assert_eq!(HttpMethod::parse("purge"), HttpMethod::Other("PURGE".to_string()));
        assert_eq!(HttpMethod::parse("purge").as_str(), "PURGE");
        assert!(HttpMethod::from("gEt").is_get());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = ApiRequest {
            url: "/".to_string(),
            method: HttpMethod::Get,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: None,
        };
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn status_class_divides_by_hundred() {
        assert_eq!(ApiResponse::buffered(204, "No Content", "").status_class(), 2);
        assert_eq!(ApiResponse::buffered(404, "Not Found", "").status_class(), 4);
        assert_eq!(ApiResponse::buffered(599, "", "").status_class(), 5);
    }

    #[tokio::test]
    async fn buffered_body_decodes_json() {
        let rsp = ApiResponse::buffered(200, "OK", r#"{"ok":true}"#);
        assert_eq!(rsp.json().await.unwrap(), json!({"ok": true}));
    }

    #[tokio::test]
    async fn buffered_body_rejects_bad_json() {
        let rsp = ApiResponse::buffered(200, "OK", "not json");
        assert!(matches!(rsp.json().await, Err(ApiError::Decode(_))));
    }
}
