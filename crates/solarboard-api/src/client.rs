// Admin API HTTP client
//
// Wraps `reqwest::Client` with bearer-token injection, 401 session purge,
// and `{ status, data, message, total, currentPage, totalPages }` envelope
// unwrapping. Resource endpoints (ads, shops, etc.) are implemented as
// inherent methods in separate files to keep this module focused on
// transport mechanics.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Error, error_message};
use crate::models::Page;
use crate::session::SessionStore;
use crate::transport::TransportConfig;

const GENERIC_FALLBACK: &str = "Request failed";

/// Unwrapped response payload plus the envelope's pagination counters.
#[derive(Debug, Clone)]
pub(crate) struct Payload<T> {
    pub data: T,
    pub total: Option<u64>,
    pub current_page: Option<u64>,
    pub total_pages: Option<u64>,
}

impl<T> Payload<Vec<T>> {
    pub(crate) fn into_page(self) -> Page<T> {
        Page {
            items: self.data,
            total: self.total,
            current_page: self.current_page,
            total_pages: self.total_pages,
        }
    }
}

/// HTTP client for the marketplace admin API.
///
/// Every request reads the current credential from the injected
/// [`SessionStore`]. A 401 from any endpoint clears that store before the
/// error is returned, so the next caller sees an anonymous session.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("logged_in", &self.session.is_logged_in())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the API host root, e.g. `https://api.example.com`.
    pub fn new(
        base_url: Url,
        session: Arc<dyn SessionStore>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, session))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, session: Arc<dyn SessionStore>) -> Self {
        Self {
            http,
            base_url,
            session,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The session store this client reads credentials from.
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/v1/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/api/v1/{path}"))?)
    }

    // ── Raw request ──────────────────────────────────────────────────

    /// Send a request with the session's bearer token attached.
    ///
    /// Returns the raw response for any status except 401, which clears
    /// the session store and yields [`Error::Unauthorized`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, Error> {
        self.dispatch(method, path, body, GENERIC_FALLBACK).await
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        fallback: &str,
    ) -> Result<reqwest::Response, Error> {
        let url = self.api_url(path)?;
        debug!("{method} {url}");

        let mut builder = self.http.request(method, url);
        if let Some(session) = self.session.load() {
            builder = builder.header(AUTHORIZATION, session.authorization());
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| Error::transport(e, fallback))?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            warn!(path, "received 401, clearing session");
            self.session.clear();
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Unauthorized {
                message: error_message(
                    Some(&text),
                    Some(&status_text(StatusCode::UNAUTHORIZED)),
                    fallback,
                ),
            });
        }

        Ok(resp)
    }

    // ── Envelope helpers ─────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        fallback: &str,
    ) -> Result<Payload<T>, Error> {
        self.send(Method::GET, path, None, fallback).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
        fallback: &str,
    ) -> Result<Payload<T>, Error> {
        let body = to_body(body)?;
        self.send(Method::POST, path, Some(&body), fallback).await
    }

    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
        fallback: &str,
    ) -> Result<Payload<T>, Error> {
        let body = to_body(body)?;
        self.send(Method::PUT, path, Some(&body), fallback).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        fallback: &str,
    ) -> Result<Payload<T>, Error> {
        self.send(Method::DELETE, path, None, fallback).await
    }

    /// POST and decode the whole body as `T`, without unwrapping `data`.
    ///
    /// Used where the backend puts fields next to `data` (the login token).
    pub(crate) async fn post_body<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
        fallback: &str,
    ) -> Result<T, Error> {
        let body = to_body(body)?;
        let (status, text) = self.send_text(Method::POST, path, Some(&body), fallback).await?;
        parse_body(status, &text, fallback)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        fallback: &str,
    ) -> Result<Payload<T>, Error> {
        let (status, text) = self.send_text(method, path, body, fallback).await?;
        parse_envelope(status, &text, fallback)
    }

    /// Send and read the body, mapping non-2xx statuses to [`Error::Api`].
    async fn send_text(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        fallback: &str,
    ) -> Result<(StatusCode, String), Error> {
        let resp = self.dispatch(method, path, body, fallback).await?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| Error::transport(e, fallback))?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: error_message(Some(&text), Some(&status_text(status)), fallback),
            });
        }

        Ok((status, text))
    }
}

/// Decode a whole response body as `T`.
///
/// An empty body, or a `status` of `false`, `"error"` or `"fail"`, is a
/// server-reported failure even on HTTP 2xx.
fn parse_body<T: DeserializeOwned>(
    status: StatusCode,
    text: &str,
    fallback: &str,
) -> Result<T, Error> {
    if text.trim().is_empty() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: "Empty response from server".into(),
        });
    }

    let value: Value = serde_json::from_str(text).map_err(|e| decode_error(&e, text))?;

    if value.get("status").is_some_and(is_failure_status) {
        return Err(Error::Api {
            status: status.as_u16(),
            message: error_message(Some(text), None, fallback),
        });
    }

    serde_json::from_value(value).map_err(|e| decode_error(&e, text))
}

/// Unwrap `{ status, data, ... }`, returning `data` (or the whole body
/// when `data` is absent) decoded as `T`.
fn parse_envelope<T: DeserializeOwned>(
    status: StatusCode,
    text: &str,
    fallback: &str,
) -> Result<Payload<T>, Error> {
    let value: Value = parse_body(status, text, fallback)?;

    let (data, total, current_page, total_pages) = match value {
        Value::Object(mut map) => {
            let total = map.get("total").and_then(Value::as_u64);
            let current_page = map.get("currentPage").and_then(Value::as_u64);
            let total_pages = map.get("totalPages").and_then(Value::as_u64);
            let data = match map.remove("data") {
                Some(Value::Null) | None => Value::Object(map),
                Some(data) => data,
            };
            (data, total, current_page, total_pages)
        }
        other => (other, None, None, None),
    };

    trace!(total, current_page, total_pages, "envelope unwrapped");

    let data = serde_json::from_value(data).map_err(|e| decode_error(&e, text))?;

    Ok(Payload {
        data,
        total,
        current_page,
        total_pages,
    })
}

fn decode_error(e: &serde_json::Error, text: &str) -> Error {
    Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(text)),
        body: text.to_owned(),
    }
}

fn is_failure_status(status: &Value) -> bool {
    match status {
        Value::Bool(ok) => !ok,
        Value::String(s) => matches!(
            s.to_ascii_lowercase().as_str(),
            "false" | "error" | "fail" | "failed"
        ),
        _ => false,
    }
}

fn status_text(status: StatusCode) -> String {
    format!("Request failed with status code {}", status.as_u16())
}

fn preview(text: &str) -> &str {
    let end = text
        .char_indices()
        .nth(200)
        .map_or(text.len(), |(i, _)| i);
    &text[..end]
}

fn to_body(body: &(impl Serialize + Sync)) -> Result<Value, Error> {
    serde_json::to_value(body).map_err(|e| Error::Deserialization {
        message: format!("failed to encode request body: {e}"),
        body: String::new(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_data_is_unwrapped_with_counters() {
        let body = json!({
            "status": true,
            "data": [1, 2, 3],
            "total": 3, "currentPage": 1, "totalPages": 1
        })
        .to_string();
        let p: Payload<Vec<u8>> = parse_envelope(StatusCode::OK, &body, "x").unwrap();
        assert_eq!(p.data, vec![1, 2, 3]);
        assert_eq!(p.total, Some(3));
        assert_eq!(p.total_pages, Some(1));
    }

    #[test]
    fn missing_data_falls_back_to_whole_body() {
        let body = json!({"pendingApprovals": 2}).to_string();
        let p: Payload<Value> = parse_envelope(StatusCode::OK, &body, "x").unwrap();
        assert_eq!(p.data["pendingApprovals"], 2);
    }

    #[test]
    fn failure_status_is_an_error_even_on_200() {
        for status in [json!(false), json!("error"), json!("fail")] {
            let body = json!({"status": status, "message": "Ad expired"}).to_string();
            let err = parse_envelope::<Value>(StatusCode::OK, &body, "x").unwrap_err();
            assert_eq!(err.to_string(), "Ad expired");
        }
    }

    #[test]
    fn empty_body_is_reported() {
        let err = parse_envelope::<Value>(StatusCode::OK, "  ", "x").unwrap_err();
        assert_eq!(err.to_string(), "Empty response from server");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let text = "é".repeat(300);
        assert_eq!(preview(&text).chars().count(), 200);
    }
}
