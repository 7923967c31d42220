//! Request model.
//!
//! # Responsibilities
//! - Hold one logical request produced by the event adapter
//! - Normalize header names to lowercase
//! - Resolve the correlation id (header, host-supplied id, or a fresh UUID)
//!
//! # Design Decisions
//! - Read-only after construction; shared as `Arc<Request>`
//! - Body JSON is parsed lazily, at most once

use std::collections::HashMap;
use std::sync::OnceLock;

use axum::http::Method;
use serde_json::Value;
use uuid::Uuid;

/// Header carrying the correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// A single logical request.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    headers: HashMap<String, String>,
    body: Option<Vec<u8>>,
    correlation_id: String,
    json: OnceLock<Option<Value>>,
}

impl Request {
    /// Start building a request.
    pub fn builder(method: Method, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            method,
            path: path.into(),
            headers: HashMap::new(),
            body: None,
            fallback_id: None,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Headers, keyed by lowercase name.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Raw body bytes, decoded from base64 when the host flagged them binary.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.header("user-agent")
    }

    /// Body parsed as JSON. `None` when there is no body or it is not JSON.
    pub fn json(&self) -> Option<&Value> {
        self.json
            .get_or_init(|| self.body.as_deref().and_then(|b| serde_json::from_slice(b).ok()))
            .as_ref()
    }
}

/// Builder for [`Request`].
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    path: String,
    headers: HashMap<String, String>,
    body: Option<Vec<u8>>,
    fallback_id: Option<String>,
}

impl RequestBuilder {
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self = self.header(name, value);
        }
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Correlation id used when the request carries no `x-request-id` header.
    pub fn fallback_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.fallback_id = Some(id.into());
        self
    }

    pub fn build(mut self) -> Request {
        let correlation_id = match self.headers.get(X_REQUEST_ID) {
            Some(id) if !id.is_empty() => id.clone(),
            _ => {
                let id = self
                    .fallback_id
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                self.headers.insert(X_REQUEST_ID.to_string(), id.clone());
                id
            }
        };

        Request {
            method: self.method,
            path: self.path,
            headers: self.headers,
            body: self.body,
            correlation_id,
            json: OnceLock::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_lowercased() {
        let req = Request::builder(Method::GET, "/")
            .header("User-Agent", "curl/8")
            .header("X-Custom", "1")
            .build();

        assert_eq!(req.headers().get("user-agent").map(String::as_str), Some("curl/8"));
        assert_eq!(req.header("X-CUSTOM"), Some("1"));
        assert_eq!(req.user_agent(), Some("curl/8"));
    }

    #[test]
    fn test_correlation_id_resolution() {
        let from_header = Request::builder(Method::GET, "/")
            .header("X-Request-Id", "abc")
            .fallback_correlation_id("host-id")
            .build();
        assert_eq!(from_header.correlation_id(), "abc");

        let from_host = Request::builder(Method::GET, "/")
            .fallback_correlation_id("host-id")
            .build();
        assert_eq!(from_host.correlation_id(), "host-id");
        assert_eq!(from_host.header(X_REQUEST_ID), Some("host-id"));

        let generated = Request::builder(Method::GET, "/").build();
        assert!(Uuid::parse_str(generated.correlation_id()).is_ok());
    }

    #[test]
    fn test_json_body() {
        let req = Request::builder(Method::POST, "/")
            .body(br#"{"item_id":"foo"}"#.to_vec())
            .build();
        assert_eq!(req.json().and_then(|v| v.get("item_id")), Some(&Value::from("foo")));

        let not_json = Request::builder(Method::POST, "/").body(b"plain".to_vec()).build();
        assert!(not_json.json().is_none());
        assert_eq!(not_json.body(), Some(&b"plain"[..]));
    }
}
