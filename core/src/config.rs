//! Per-call options and a configuration-driven service.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::service::Service;
use crate::transport::Transport;

/// Options for a single request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    /// Do not call `Service::handle_error` for this request; the error is
    /// still returned.
    #[serde(alias = "skipErrorHandler")]
    pub skip_error_handler: bool,
}

impl RequestOptions {
    /// Options that bypass the error hook.
    pub fn silent() -> Self {
        Self {
            skip_error_handler: true,
        }
    }
}

/// Static description of a service endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub headers: Vec<(String, String)>,
}

impl ServiceConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Parse from JSON, e.g. `{"base_url": "...", "headers": [["k", "v"]]}`.
    pub fn from_json(raw: &str) -> Result<Self, ApiError> {
        let config: ServiceConfig =
            serde_json::from_str(raw).map_err(|e| ApiError::Decode(format!("service config: {e}")))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers: config.headers,
        })
    }
}

/// A `Service` whose base URL and headers come from a `ServiceConfig`.
///
/// Failed requests are logged at `warn` level.
#[derive(Debug, Clone)]
pub struct ConfiguredService<T> {
    config: ServiceConfig,
    transport: T,
}

impl<T: Transport> ConfiguredService<T> {
    pub fn new(config: ServiceConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

impl<T: Transport> Service for ConfiguredService<T> {
    fn transport(&self) -> &dyn Transport {
        &self.transport
    }

    fn base_url(&self) -> String {
        self.config.base_url.clone()
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.config.headers.clone()
    }

    fn handle_error(&self, message: &str, status: i32, _err: &ApiError) {
        log::warn!("request to {} failed with status {status}: {message}", self.config.base_url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_to_running_the_hook() {
        assert!(!RequestOptions::default().skip_error_handler);
        assert!(RequestOptions::silent().skip_error_handler);
    }

    #[test]
    fn options_accept_camel_case_alias() {
        let opts: RequestOptions = serde_json::from_str(r#"{"skipErrorHandler":true}"#).unwrap();
        assert!(opts.skip_error_handler);
        let opts: RequestOptions = serde_json::from_str("{}").unwrap();
        assert!(!opts.skip_error_handler);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        assert_eq!(ServiceConfig::new("http://localhost:3000/").base_url, "http://localhost:3000");
    }

    #[test]
    fn config_parses_from_json() {
        let config = ServiceConfig::from_json(
            r#"{"base_url":"https://api.example.com/","headers":[["authorization","Bearer t"]]}"#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.headers, vec![("authorization".to_string(), "Bearer t".to_string())]);
    }

    #[test]
    fn config_rejects_bad_json() {
        assert!(matches!(ServiceConfig::from_json("nope"), Err(ApiError::Decode(_))));
    }
}
