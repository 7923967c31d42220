//! Error types shared by handlers and the request pipeline.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::http::response::reason_phrase;

/// Boxed error accepted from handler code.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A deliberate, application-raised HTTP outcome.
///
/// `detail` is returned to the client; `error_detail` only reaches the logs.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerError {
    status: StatusCode,
    detail: Option<Value>,
    error_detail: Option<String>,
    headers: HashMap<String, String>,
}

impl HandlerError {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            detail: None,
            error_detail: None,
            headers: HashMap::new(),
        }
    }

    /// Client-visible detail.
    pub fn with_detail(mut self, detail: impl Into<Value>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Operator-only detail, shown in logs but never returned to the caller.
    pub fn with_error_detail(mut self, error_detail: impl Into<String>) -> Self {
        self.error_detail = Some(error_detail.into());
        self
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> Option<&Value> {
        self.detail.as_ref()
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Detail for the access log: the operator detail, else the client detail.
    pub fn error_detail(&self) -> Option<String> {
        match (&self.error_detail, &self.detail) {
            (Some(error_detail), _) => Some(error_detail.clone()),
            (None, Some(Value::String(detail))) => Some(detail.clone()),
            (None, Some(Value::Null)) | (None, None) => None,
            (None, Some(detail)) => Some(detail.to_string()),
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status.as_u16())?;
        match self.error_detail() {
            Some(detail) => write!(f, ": {detail}"),
            None => write!(f, ": {}", reason_phrase(self.status)),
        }
    }
}

impl StdError for HandlerError {}

/// One field-level validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc: vec![field.into()],
            msg: msg.into(),
            kind: kind.into(),
        }
    }
}

/// Parameter binding or schema validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(transparent)]
#[error("{} validation error(s)", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(&self.errors).unwrap_or(Value::Null)
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self::new(vec![error])
    }
}

/// Failure returned by a route handler.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    Unhandled(BoxError),
}

impl RouteError {
    /// Wrap any error as an unhandled failure.
    pub fn unhandled(error: impl Into<BoxError>) -> Self {
        Self::Unhandled(error.into())
    }
}

/// A failure nobody classified. Never turned into a client response.
#[derive(Debug, Error)]
pub enum UnhandledError {
    #[error("{0}")]
    Error(BoxError),

    #[error("handler panicked: {0}")]
    Panic(String),
}

impl UnhandledError {
    /// The error and its source chain, one cause per segment.
    pub fn report(&self) -> String {
        let mut report = self.to_string();
        if let UnhandledError::Error(error) = self {
            let mut source = error.source();
            while let Some(cause) = source {
                report.push_str(": ");
                report.push_str(&cause.to_string());
                source = cause.source();
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_detail_fallbacks() {
        let bare = HandlerError::new(StatusCode::BAD_REQUEST);
        assert_eq!(bare.error_detail(), None);
        assert_eq!(bare.to_string(), "HTTP 400: Bad Request");

        let message = HandlerError::new(StatusCode::BAD_REQUEST).with_detail("Custom Error Message");
        assert_eq!(message.error_detail().as_deref(), Some("Custom Error Message"));

        let both = message.clone().with_error_detail("detail");
        assert_eq!(both.error_detail().as_deref(), Some("detail"));
        assert_eq!(both.detail(), Some(&json!("Custom Error Message")));
    }

    #[test]
    fn test_validation_errors_serialize_as_list() {
        let errors = ValidationErrors::from(FieldError::new("value", "value is not a valid integer", "type_error.integer"));
        assert_eq!(
            errors.to_value(),
            json!([{"loc": ["value"], "msg": "value is not a valid integer", "type": "type_error.integer"}])
        );
        assert_eq!(errors.to_string(), "1 validation error(s)");
    }

    #[test]
    fn test_unhandled_report_walks_sources() {
        #[derive(Debug, Error)]
        #[error("loading item")]
        struct Outer(#[source] std::io::Error);

        let err = UnhandledError::Error(Box::new(Outer(std::io::Error::other("disk gone"))));
        assert_eq!(err.report(), "loading item: disk gone");
    }
}
