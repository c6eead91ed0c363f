//! Extension points of a typed API service.
//!
//! # Design
//! A concrete service implements `Service` and overrides only the hooks it
//! cares about; every method except `transport` has a default. The hooks all
//! take `&self`, so one service value can carry its own configuration
//! without per-call closures. The request routine that drives these hooks
//! lives in `ServiceExt` and is not meant to be overridden.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::http::{ApiRequest, ApiResponse};
use crate::params::{self, Params, QueryData};
use crate::transport::Transport;

#[async_trait]
pub trait Service: Send + Sync {
    /// Transport used by the default `handle_fetch`.
    fn transport(&self) -> &dyn Transport;

    /// Resolve `:name` placeholders in `path` from the cleaned data.
    ///
    /// The default never fails and writes `undefined` for missing names.
    /// Overrides may return an error to reject the request; it is routed
    /// through `handle_error` like any other failure.
    fn replace_url_params(&self, path: &str, params: &Params) -> Result<String, ApiError> {
        Ok(params::replace_url_params(path, params))
    }

    fn omit_undefined(&self, data: QueryData) -> Params {
        params::omit_undefined(data)
    }

    fn stringify_query(&self, params: &Params) -> String {
        params::stringify_query(params)
    }

    /// Prefix prepended to every resolved path.
    fn base_url(&self) -> String {
        String::new()
    }

    /// Extra headers; these win over the default `content-type`.
    fn headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Observer for failed requests. Its outcome never changes the result.
    fn handle_error(&self, _message: &str, _status: i32, _err: &ApiError) {}

    async fn handle_fetch(&self, req: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.transport().fetch(req).await
    }
}
