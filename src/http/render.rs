//! Response rendering into the host's output envelope.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};

use crate::http::request::X_REQUEST_ID;
use crate::http::response::{Content, Response};

/// Serializer used for JSON content.
pub trait JsonEncoder: Send + Sync + Debug {
    fn encode(&self, value: &Value) -> String;
}

/// Compact JSON, the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactJson;

impl JsonEncoder for CompactJson {
    fn encode(&self, value: &Value) -> String {
        value.to_string()
    }
}

/// Indented JSON, handy when reading responses by eye.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrettyJson;

impl JsonEncoder for PrettyJson {
    fn encode(&self, value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }
}

/// Field naming of the single-response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeFormat {
    /// `isBodyBinary`
    Generic,
    /// `isBase64Encoded`, as API gateways expect.
    ApiGateway,
}

/// A rendered single response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_binary: bool,
}

impl ResponseEnvelope {
    pub fn to_json(&self, format: EnvelopeFormat) -> Value {
        let binary_flag = match format {
            EnvelopeFormat::Generic => "isBodyBinary",
            EnvelopeFormat::ApiGateway => "isBase64Encoded",
        };
        let mut envelope = json!({
            "statusCode": self.status_code,
            "headers": self.headers,
            "body": self.body,
        });
        envelope[binary_flag] = Value::Bool(self.is_binary);
        envelope
    }

    /// Body bytes as the client should see them.
    pub fn decoded_body(&self) -> Result<Vec<u8>, base64::DecodeError> {
        if self.is_binary {
            STANDARD.decode(&self.body)
        } else {
            Ok(self.body.clone().into_bytes())
        }
    }
}

/// Turns a [`Response`] into a [`ResponseEnvelope`].
#[derive(Debug, Clone)]
pub struct ResponseRenderer {
    encoder: Arc<dyn JsonEncoder>,
}

impl ResponseRenderer {
    pub fn new(encoder: Arc<dyn JsonEncoder>) -> Self {
        Self { encoder }
    }

    pub fn render(&self, response: Response, correlation_id: &str) -> ResponseEnvelope {
        let (status, headers, media_type, content) = response.into_parts();

        let mut headers: BTreeMap<String, String> = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();

        let (body, is_binary, length) = match content {
            Content::Empty => (None, false, 0),
            Content::Text(text) => {
                let len = text.len();
                (Some(text), false, len)
            }
            Content::Binary(bytes) => (Some(STANDARD.encode(&bytes)), true, bytes.len()),
            Content::Json(value) => {
                let text = self.encoder.encode(&value);
                let len = text.len();
                (Some(text), false, len)
            }
        };

        if body.is_some() {
            headers.insert("content-length".to_string(), length.to_string());
            if let Some(media_type) = media_type {
                headers.insert("content-type".to_string(), media_type);
            }
        }
        headers
            .entry(X_REQUEST_ID.to_string())
            .or_insert_with(|| correlation_id.to_string());

        ResponseEnvelope {
            status_code: status.as_u16(),
            headers,
            body: body.unwrap_or_default(),
            is_binary,
        }
    }
}

impl Default for ResponseRenderer {
    fn default() -> Self {
        Self::new(Arc::new(CompactJson))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::{APPLICATION_JSON, APPLICATION_OCTET_STREAM};
    use axum::http::StatusCode;

    #[test]
    fn test_json_body() {
        let envelope = ResponseRenderer::default().render(Response::json(json!("get")), "req-1");

        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.body, "\"get\"");
        assert!(!envelope.is_binary);
        assert_eq!(envelope.headers["content-type"], APPLICATION_JSON);
        assert_eq!(envelope.headers["content-length"], "5");
        assert_eq!(envelope.headers["x-request-id"], "req-1");
    }

    #[test]
    fn test_binary_body_is_base64() {
        let data = vec![0u8, 159, 146, 150, 255];
        let envelope = ResponseRenderer::default()
            .render(Response::binary(data.clone(), APPLICATION_OCTET_STREAM), "req-1");

        assert!(envelope.is_binary);
        assert_eq!(envelope.headers["content-length"], data.len().to_string());
        assert_eq!(envelope.decoded_body().unwrap(), data);
    }

    #[test]
    fn test_empty_body_has_no_content_headers() {
        let envelope = ResponseRenderer::default()
            .render(Response::new(StatusCode::NO_CONTENT).with_header("X-Request-Id", "mine"), "req-1");

        assert_eq!(envelope.status_code, 204);
        assert_eq!(envelope.body, "");
        assert!(!envelope.headers.contains_key("content-length"));
        assert_eq!(envelope.headers["x-request-id"], "mine");
    }

    #[test]
    fn test_envelope_formats() {
        let envelope = ResponseRenderer::new(Arc::new(PrettyJson)).render(Response::text("hi"), "id");

        let generic = envelope.to_json(EnvelopeFormat::Generic);
        assert_eq!(generic["statusCode"], 200);
        assert_eq!(generic["isBodyBinary"], false);
        assert!(generic.get("isBase64Encoded").is_none());

        let gateway = envelope.to_json(EnvelopeFormat::ApiGateway);
        assert_eq!(gateway["isBase64Encoded"], false);
        assert_eq!(gateway["body"], "hi");
    }
}
