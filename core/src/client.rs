//! Request orchestration on top of a `Service`.
//!
//! # Design
//! `ServiceExt::request` is split the same way as the rest of the crate:
//! `build_request` turns a path template and data into an `ApiRequest`,
//! the service's `handle_fetch` performs the round trip, and
//! `parse_response` classifies the `ApiResponse`. Every failure, wherever it
//! happens, passes through the service's error hook exactly once (unless the
//! call opted out) and is then returned unchanged.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::RequestOptions;
use crate::error::ApiError;
use crate::http::{ApiRequest, ApiResponse, HttpMethod};
use crate::params::{value_to_string, QueryData};
use crate::service::Service;

const CONTENT_TYPE: &str = "content-type";
const APPLICATION_JSON: &str = "application/json";

/// The request routine, available on every `Service`.
#[async_trait]
pub trait ServiceExt: Service {
    /// Build, send and classify one request.
    ///
    /// For GET the data is appended as a query string; for every other
    /// method it is sent as the JSON body. In both cases it is also the
    /// source for `:name` path placeholders.
    async fn request<T>(
        &self,
        path: &str,
        method: &str,
        data: QueryData,
        options: RequestOptions,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Send;

    async fn get<T>(&self, path: &str, data: QueryData) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Send,
    {
        self.request(path, "GET", data, RequestOptions::default()).await
    }

    async fn post<T>(&self, path: &str, data: QueryData) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Send,
    {
        self.request(path, "POST", data, RequestOptions::default()).await
    }

    async fn put<T>(&self, path: &str, data: QueryData) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Send,
    {
        self.request(path, "PUT", data, RequestOptions::default()).await
    }

    async fn delete<T>(&self, path: &str, data: QueryData) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Send,
    {
        self.request(path, "DELETE", data, RequestOptions::default()).await
    }
}

#[async_trait]
impl<S: Service + ?Sized> ServiceExt for S {
    async fn request<T>(
        &self,
        path: &str,
        method: &str,
        data: QueryData,
        options: RequestOptions,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Send,
    {
        let result = perform(self, path, HttpMethod::parse(method), data).await;
        if let Err(err) = &result {
            let (message, status) = (err.message(), err.status());
            log::debug!("{method} {path} failed ({status}): {message}");
            if !options.skip_error_handler {
                self.handle_error(&message, status, err);
            }
        }
        result
    }
}

async fn perform<S, T>(service: &S, path: &str, method: HttpMethod, data: QueryData) -> Result<T, ApiError>
where
    S: Service + ?Sized,
    T: DeserializeOwned + Send,
{
    let req = build_request(service, path, method, data)?;
    log::debug!("{} {}", req.method, req.url);

    let rsp = service.handle_fetch(req).await?;
    log::debug!("received {} {}", rsp.status, rsp.status_text);

    let value = parse_response(rsp).await?;
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Assemble the outbound request for `path` using the service's hooks.
pub fn build_request<S: Service + ?Sized>(
    service: &S,
    path: &str,
    method: HttpMethod,
    data: QueryData,
) -> Result<ApiRequest, ApiError> {
    let params = service.omit_undefined(data);
    let path = service.replace_url_params(path, &params)?;

    let is_get = method.is_get();
    let mut url = service.base_url() + &path;
    if is_get {
        url.push('?');
        url.push_str(&service.stringify_query(&params));
    }

    let headers = merge_headers(
        vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())],
        service.headers(),
    );

    let body = if is_get {
        None
    } else {
        Some(serde_json::to_string(&Value::Object(params)).map_err(|e| ApiError::Serialization(e.to_string()))?)
    };

    Ok(ApiRequest {
        url,
        method,
        headers,
        body,
    })
}

/// Classify a response by status class and decode its body when needed.
///
/// 5xx fails without reading the body. Any other non-2xx status reads the
/// body for a `message` field, falling back to the status text when the
/// field is missing, `null`, `false`, `0` or `""`.
pub async fn parse_response(rsp: ApiResponse) -> Result<Value, ApiError> {
    let status = rsp.status;
    let status_class = rsp.status_class();
    if status_class == 5 {
        return Err(ApiError::Server { status });
    }

    let status_text = rsp.status_text.clone();
    let data = rsp.json().await?;

    if status_class != 2 {
        let message = match data.get("message") {
            Some(m) if is_truthy(m) => value_to_string(m),
            _ => status_text,
        };
        return Err(ApiError::Http {
            message,
            status,
            response: data,
        });
    }

    Ok(data)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Overlay `extra` onto `base`. Names compare case-insensitively; a
/// colliding entry keeps its position and takes the overriding pair.
fn merge_headers(mut base: Vec<(String, String)>, extra: Vec<(String, String)>) -> Vec<(String, String)> {
    for (name, value) in extra {
        match base.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some(slot) => *slot = (name, value),
            None => base.push((name, value)),
        }
    }
    base
}
