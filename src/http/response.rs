//! Response model.
//!
//! # Responsibilities
//! - Represent a handler's response (status, headers, media type, content)
//! - Provide the mutable default response injected into handlers
//!
//! # Design Decisions
//! - Content is a closed enum; rendering decides how each kind hits the wire
//! - A `Response` is consumed by value when rendered, so it renders once

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::http::StatusCode;
use serde_json::{json, Value};

pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";

/// Response content.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Empty,
    Text(String),
    Binary(Vec<u8>),
    Json(Value),
}

/// A response produced by a handler or by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    headers: HashMap<String, String>,
    media_type: Option<String>,
    content: Content,
}

impl Response {
    /// An empty response with the given status.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            media_type: None,
            content: Content::Empty,
        }
    }

    pub fn json(value: Value) -> Self {
        Self {
            media_type: Some(APPLICATION_JSON.to_string()),
            content: Content::Json(value),
            ..Self::new(StatusCode::OK)
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            media_type: Some(TEXT_PLAIN.to_string()),
            content: Content::Text(text.into()),
            ..Self::new(StatusCode::OK)
        }
    }

    pub fn binary(bytes: impl Into<Vec<u8>>, media_type: impl Into<String>) -> Self {
        Self {
            media_type: Some(media_type.into()),
            content: Content::Binary(bytes.into()),
            ..Self::new(StatusCode::OK)
        }
    }

    /// `{"detail": ...}` JSON error body.
    pub fn detail(status: StatusCode, detail: Value) -> Self {
        Self::json(json!({ "detail": detail })).with_status(status)
    }

    /// `{"detail": "<reason phrase>"}` for the given status.
    pub fn reason(status: StatusCode) -> Self {
        Self::detail(status, Value::from(reason_phrase(status)))
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.headers
    }

    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub(crate) fn into_parts(self) -> (StatusCode, HashMap<String, String>, Option<String>, Content) {
        (self.status, self.headers, self.media_type, self.content)
    }
}

/// Canonical reason phrase, or the numeric code when there is none.
pub fn reason_phrase(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string())
}

#[derive(Debug)]
struct ResponseDefaults {
    status: StatusCode,
    status_set: bool,
    headers: HashMap<String, String>,
}

/// Mutable default response injected into handlers that declare one.
///
/// Clones share the same state; the dispatcher reads it back after the
/// handler returns.
#[derive(Debug, Clone)]
pub struct ResponseHandle {
    inner: Arc<Mutex<ResponseDefaults>>,
}

impl ResponseHandle {
    pub fn new(status: StatusCode) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ResponseDefaults {
                status,
                status_set: false,
                headers: HashMap::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ResponseDefaults> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn status(&self) -> StatusCode {
        self.lock().status
    }

    pub fn set_status(&self, status: StatusCode) {
        let mut defaults = self.lock();
        defaults.status = status;
        defaults.status_set = true;
    }

    /// True once the handler has called [`set_status`](Self::set_status).
    pub fn status_set(&self) -> bool {
        self.lock().status_set
    }

    pub fn insert_header(&self, name: impl AsRef<str>, value: impl Into<String>) {
        self.lock()
            .headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn headers(&self) -> HashMap<String, String> {
        self.lock().headers.clone()
    }
}

impl Default for ResponseHandle {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}
