//! Invocation payload normalization.
//!
//! # Responsibilities
//! - Classify a raw payload as a single request or a record batch
//! - Build one [`Request`] per logical request
//! - Fail loudly on shapes nobody registered for
//!
//! # Design Decisions
//! - Classification order: API gateway, generic single, generic batch,
//!   `Records[]`, broker messages
//! - Record payloads may be JSON strings or inline objects
//! - An unrecognized shape is a contract mismatch with the host, never a 4xx

use axum::http::Method;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::event::sources::BatchSource;
use crate::http::render::EnvelopeFormat;
use crate::http::request::Request;

/// Fatal payload errors.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("unrecognized invocation payload: {0}")]
    UnrecognizedShape(String),

    #[error("unsupported event source '{0}'")]
    UnsupportedSource(String),

    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("record {index}: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: Box<EventError>,
    },

    #[error("invalid base64 body: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("record payload is not JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One record of a batch.
#[derive(Debug)]
pub struct Record {
    pub id: String,
    pub request: Request,
}

/// A classified invocation.
#[derive(Debug)]
pub enum Invocation {
    Single { request: Request, format: EnvelopeFormat },
    Batch { source: BatchSource, records: Vec<Record> },
}

/// Classify `payload` and build its request(s).
pub fn adapt(payload: &Value) -> Result<Invocation, EventError> {
    let object = payload
        .as_object()
        .ok_or_else(|| EventError::UnrecognizedShape(format!("expected an object, got {}", kind_of(payload))))?;

    if object.contains_key("requestContext") || object.contains_key("method") {
        let (request, format) = single(object)?;
        return Ok(Invocation::Single { request, format });
    }

    if let Some(records) = object.get("records") {
        return batch(BatchSource::Generic, records);
    }

    if let Some(records) = object.get("Records") {
        let source = match records.as_array().and_then(|r| r.first()) {
            None => BatchSource::Empty,
            Some(first) => {
                let tag = first
                    .get("eventSource")
                    .or_else(|| first.get("EventSource"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                BatchSource::from_event_source(tag).ok_or_else(|| EventError::UnsupportedSource(tag.to_string()))?
            }
        };
        return batch(source, records);
    }

    if let Some(tag) = object.get("eventSource").and_then(Value::as_str) {
        return match BatchSource::from_event_source(tag) {
            Some(BatchSource::Mq) => batch(BatchSource::Mq, object.get("messages").unwrap_or(&Value::Null)),
            _ => Err(EventError::UnsupportedSource(tag.to_string())),
        };
    }

    Err(EventError::UnrecognizedShape(
        "no requestContext, method, records, Records or eventSource key".to_string(),
    ))
}

fn batch(source: BatchSource, records: &Value) -> Result<Invocation, EventError> {
    let records = records.as_array().ok_or(EventError::InvalidField {
        field: "records",
        reason: format!("expected an array, got {}", kind_of(records)),
    })?;

    let records = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            record_request(source, record).map_err(|e| EventError::InvalidRecord {
                index,
                source: Box::new(e),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Invocation::Batch { source, records })
}

fn record_request(source: BatchSource, record: &Value) -> Result<Record, EventError> {
    let (id, payload) = source.extract(record).ok_or_else(|| {
        EventError::UnrecognizedShape(format!("{} record without an id and payload", source.as_str()))
    })?;

    let payload = match payload {
        Value::String(text) => decode_payload(source, text)?,
        other => other.clone(),
    };

    let object = payload
        .as_object()
        .filter(|o| o.contains_key("requestContext") || o.contains_key("method"))
        .ok_or_else(|| EventError::UnrecognizedShape("record payload is not a single request".to_string()))?;

    let (request, _) = single(object)?;
    Ok(Record { id, request })
}

/// Broker payloads may arrive base64 encoded.
fn decode_payload(source: BatchSource, text: &str) -> Result<Value, EventError> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(err) if source == BatchSource::Mq => {
            let bytes = STANDARD.decode(text.trim()).map_err(|_| EventError::Json(err))?;
            Ok(serde_json::from_slice(&bytes)?)
        }
        Err(err) => Err(err.into()),
    }
}

fn single(object: &Map<String, Value>) -> Result<(Request, EnvelopeFormat), EventError> {
    let (method, path, binary_key, fallback_id, format) = match object.get("requestContext") {
        Some(context) => {
            // HTTP APIs nest method and path under `http`; REST APIs do not.
            let (method, path) = match context.get("http") {
                Some(http) => (http.get("method"), http.get("path")),
                None => (context.get("httpMethod"), context.get("path")),
            };
            let request_id = context.get("requestId").and_then(Value::as_str);
            (method, path, "isBase64Encoded", request_id, EnvelopeFormat::ApiGateway)
        }
        None => (
            object.get("method"),
            object.get("path"),
            "isBodyBinary",
            None,
            EnvelopeFormat::Generic,
        ),
    };

    let method = required_str(method, "method")?;
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| EventError::InvalidMethod(method.to_string()))?;
    let path = required_str(path, "path")?;

    let mut builder = Request::builder(method, path).headers(headers(object.get("headers"))?);
    if let Some(id) = fallback_id {
        builder = builder.fallback_correlation_id(id);
    }

    let binary = object.get(binary_key).and_then(Value::as_bool).unwrap_or(false);
    match object.get("body") {
        None | Some(Value::Null) => {}
        Some(Value::String(body)) if binary => builder = builder.body(STANDARD.decode(body)?),
        Some(Value::String(body)) => builder = builder.body(body.as_bytes().to_vec()),
        Some(inline) => builder = builder.body(serde_json::to_vec(inline)?),
    }

    Ok((builder.build(), format))
}

fn required_str<'a>(value: Option<&'a Value>, field: &'static str) -> Result<&'a str, EventError> {
    match value {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(EventError::InvalidField {
            field,
            reason: format!("expected a string, got {}", kind_of(other)),
        }),
        None => Err(EventError::InvalidField {
            field,
            reason: "missing".to_string(),
        }),
    }
}

fn headers(value: Option<&Value>) -> Result<Vec<(String, String)>, EventError> {
    let map = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(EventError::InvalidField {
                field: "headers",
                reason: format!("expected an object, got {}", kind_of(other)),
            })
        }
    };

    let mut headers = Vec::with_capacity(map.len());
    for (name, value) in map {
        let value = match value {
            Value::String(s) => s.clone(),
            Value::Null => continue,
            Value::Number(_) | Value::Bool(_) => value.to_string(),
            other => {
                return Err(EventError::InvalidField {
                    field: "headers",
                    reason: format!("header '{name}' is {}", kind_of(other)),
                })
            }
        };
        headers.push((name.clone(), value));
    }
    Ok(headers)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
