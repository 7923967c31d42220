//! Classified result of one dispatch.

use axum::http::StatusCode;
use serde_json::Value;

use crate::error::{HandlerError, RouteError, UnhandledError, ValidationErrors};
use crate::http::response::{Content, Response};
use crate::observability::LogLevel;
use crate::resilience::DeadlineExceeded;

/// What happened to a request.
#[derive(Debug)]
pub enum Outcome {
    /// The handler returned normally.
    Completed(Response),
    /// No route for (method, path).
    RouteNotFound,
    Validation(ValidationErrors),
    Handler(HandlerError),
    DeadlineExceeded(DeadlineExceeded),
    /// Anything else, including handler panics.
    Unhandled(UnhandledError),
}

impl Outcome {
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Completed(response) => response.status(),
            Outcome::RouteNotFound => StatusCode::NOT_FOUND,
            Outcome::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Outcome::Handler(error) => error.status(),
            Outcome::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
            Outcome::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn level(&self) -> LogLevel {
        match self {
            Outcome::Unhandled(_) => LogLevel::Critical,
            other => LogLevel::for_status(other.status().as_u16()),
        }
    }

    /// Operator-facing detail for the access log.
    pub fn error_detail(&self) -> Option<Value> {
        match self {
            Outcome::Completed(_) | Outcome::RouteNotFound => None,
            Outcome::Validation(errors) => Some(errors.to_value()),
            Outcome::Handler(error) => error.error_detail().map(Value::String),
            Outcome::DeadlineExceeded(error) => Some(Value::String(error.to_string())),
            Outcome::Unhandled(error) => Some(Value::String(error.report())),
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Completed(_) => "completed",
            Outcome::RouteNotFound => "route_not_found",
            Outcome::Validation(_) => "validation",
            Outcome::Handler(_) => "handler",
            Outcome::DeadlineExceeded(_) => "deadline_exceeded",
            Outcome::Unhandled(_) => "unhandled",
        }
    }

    /// A batch record counts as processed only on a normal, non-error return.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Completed(response) if response.status().as_u16() < 400)
    }

    /// Client response for this outcome. Unhandled failures are handed back
    /// untouched instead.
    pub fn into_response(self) -> Result<Response, UnhandledError> {
        let response = match self {
            Outcome::Completed(response) => with_error_body(response),
            Outcome::RouteNotFound => Response::new(StatusCode::NOT_FOUND),
            Outcome::Validation(errors) => Response::detail(StatusCode::UNPROCESSABLE_ENTITY, errors.to_value()),
            Outcome::Handler(error) => {
                let mut response = match error.detail() {
                    Some(detail) => Response::detail(error.status(), detail.clone()),
                    None => Response::reason(error.status()),
                };
                response.headers_mut().extend(error.headers().clone());
                response
            }
            Outcome::DeadlineExceeded(_) => Response::reason(StatusCode::GATEWAY_TIMEOUT),
            Outcome::Unhandled(error) => return Err(error),
        };
        Ok(response)
    }
}

/// Empty error responses get the reason phrase as detail.
fn with_error_body(response: Response) -> Response {
    if response.status().as_u16() < 400 || *response.content() != Content::Empty {
        return response;
    }
    let mut body = Response::reason(response.status());
    body.headers_mut().extend(response.headers().clone());
    body
}

impl From<RouteError> for Outcome {
    fn from(error: RouteError) -> Self {
        match error {
            RouteError::Handler(error) => Outcome::Handler(error),
            RouteError::Validation(errors) => Outcome::Validation(errors),
            RouteError::Unhandled(error) => Outcome::Unhandled(UnhandledError::Error(error)),
        }
    }
}
