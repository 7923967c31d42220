//! Parameter binding.
//!
//! # Responsibilities
//! - Inject the request and the default response where declared
//! - Resolve value parameters from top-level JSON body keys, by exact name
//! - Run the optional schema validator on every value parameter
//!
//! # Design Decisions
//! - Binding never mutates the request
//! - All field errors are collected before failing
//! - Without a validator, a missing required value is a generic 422

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::Value;

use crate::binding::args::{Arg, Args};
use crate::binding::params::{Param, ParamKind};
use crate::binding::schema::SchemaValidator;
use crate::error::{HandlerError, RouteError, ValidationErrors};
use crate::http::request::Request;
use crate::http::response::ResponseHandle;
use crate::resilience::CancelSignal;

/// Resolves declared parameters from a request.
#[derive(Debug, Clone, Default)]
pub struct ParameterBinder {
    validator: Option<Arc<dyn SchemaValidator>>,
}

impl ParameterBinder {
    pub fn new(validator: Option<Arc<dyn SchemaValidator>>) -> Self {
        Self { validator }
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    pub fn bind(
        &self,
        params: &[Param],
        request: &Arc<Request>,
        response: &ResponseHandle,
        cancel: CancelSignal,
    ) -> Result<Args, RouteError> {
        let body = request.json().and_then(Value::as_object);
        let mut values = HashMap::with_capacity(params.len());
        let mut errors = Vec::new();
        let mut missing = Vec::new();

        for param in params {
            let arg = match param.kind() {
                ParamKind::Request => Arg::Request(request.clone()),
                ParamKind::Response => Arg::Response(response.clone()),
                ParamKind::Value(_) => {
                    let raw = body.and_then(|body| body.get(param.name()));
                    match (&self.validator, raw) {
                        (Some(validator), raw) => match validator.validate(param, raw) {
                            Ok(value) => Arg::Value(value),
                            Err(error) => {
                                errors.push(error);
                                continue;
                            }
                        },
                        (None, Some(value)) => Arg::Value(value.clone()),
                        (None, None) if param.is_required() => {
                            missing.push(param.name());
                            continue;
                        }
                        (None, None) => Arg::Value(Value::Null),
                    }
                }
            };
            values.insert(param.name().to_string(), arg);
        }

        if !errors.is_empty() {
            return Err(ValidationErrors::new(errors).into());
        }
        if !missing.is_empty() {
            return Err(HandlerError::new(StatusCode::UNPROCESSABLE_ENTITY)
                .with_error_detail(format!("missing required parameter(s): {}", missing.join(", ")))
                .into());
        }

        Ok(Args::new(values, cancel))
    }
}
