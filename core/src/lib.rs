//! Base abstraction for typed HTTP API services.
//!
//! # Overview
//! A concrete API implements `Service`, supplying a `Transport` and
//! overriding whichever hooks it needs (base URL, headers, error hook, ...).
//! `ServiceExt::request` then turns a `:name` path template plus
//! `QueryData` into an `ApiRequest`, sends it, and classifies the response
//! into a decoded `T` or an `ApiError`.
//!
//! # Design
//! - The orchestration is stateless; every call builds its own request and
//!   consumes its own response.
//! - The transport is injected, so the crate never decides how I/O happens.
//!   `ReqwestTransport` is bundled behind the `reqwest-client` feature.
//! - All failures reach the service's `handle_error` hook before they are
//!   returned, unless the call passes `RequestOptions::silent()`.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
pub mod service;
pub mod transport;

pub use client::{build_request, parse_response, ServiceExt};
pub use config::{ConfiguredService, RequestOptions, ServiceConfig};
pub use error::{ApiError, NO_STATUS};
pub use http::{ApiRequest, ApiResponse, BufferedBody, HttpMethod, ResponseBody};
pub use params::{Params, QueryData};
pub use service::Service;
#[cfg(feature = "reqwest-client")]
pub use transport::ReqwestTransport;
pub use transport::Transport;
