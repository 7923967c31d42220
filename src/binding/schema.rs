//! Optional schema validation capability.
//!
//! # Design Decisions
//! - Validation is a trait object so embedders can bring their own rules
//! - The bundled [`TypeCoercion`] accepts lossless conversions only

use std::fmt::Debug;

use serde_json::{Number, Value};

use crate::binding::params::{Param, ParamKind, ParamType};
use crate::error::FieldError;

/// Checks and coerces one body-bound parameter.
pub trait SchemaValidator: Send + Sync + Debug {
    /// `value` is `None` when the body has no such key.
    fn validate(&self, param: &Param, value: Option<&Value>) -> Result<Value, FieldError>;
}

/// Coerces values to their declared [`ParamType`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeCoercion;

impl SchemaValidator for TypeCoercion {
    fn validate(&self, param: &Param, value: Option<&Value>) -> Result<Value, FieldError> {
        let name = param.name();
        let value = match value {
            None if param.is_required() => {
                return Err(FieldError::new(name, "field required", "value_error.missing"));
            }
            None => return Ok(Value::Null),
            Some(Value::Null) if param.is_required() => {
                return Err(FieldError::new(name, "none is not an allowed value", "type_error.none.not_allowed"));
            }
            Some(Value::Null) => return Ok(Value::Null),
            Some(value) => value,
        };

        let ty = match param.kind() {
            ParamKind::Value(ty) => ty,
            ParamKind::Request | ParamKind::Response => return Ok(value.clone()),
        };

        let (coerced, msg, kind) = match ty {
            ParamType::Json => return Ok(value.clone()),
            ParamType::Text => (coerce_text(value), "str type expected", "type_error.str"),
            ParamType::Integer => (coerce_integer(value), "value is not a valid integer", "type_error.integer"),
            ParamType::Float => (coerce_float(value), "value is not a valid float", "type_error.float"),
            ParamType::Boolean => (coerce_boolean(value), "value could not be parsed to a boolean", "type_error.bool"),
        };

        coerced.ok_or_else(|| FieldError::new(name, msg, kind))
    }
}

fn coerce_text(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Number(n) => Some(Value::String(n.to_string())),
        _ => None,
    }
}

fn coerce_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| Value::from(f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn coerce_float(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => n.as_f64().and_then(Number::from_f64).map(Value::Number),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

fn coerce_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(Value::Bool(false)),
            Some(1) => Some(Value::Bool(true)),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(Value::Bool(true)),
            "false" | "0" | "no" | "off" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(param: Param, value: Value) -> Result<Value, FieldError> {
        TypeCoercion.validate(&param, Some(&value))
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(check(Param::integer("v"), json!(1)), Ok(json!(1)));
        assert_eq!(check(Param::integer("v"), json!("42")), Ok(json!(42)));
        assert_eq!(check(Param::integer("v"), json!(3.0)), Ok(json!(3)));

        let err = check(Param::integer("v"), json!("a")).unwrap_err();
        assert_eq!(err.kind, "type_error.integer");
        assert_eq!(err.loc, vec!["v".to_string()]);

        assert!(check(Param::integer("v"), json!(1.5)).is_err());
    }

    #[test]
    fn test_text_float_boolean() {
        assert_eq!(check(Param::text("v"), json!("foo")), Ok(json!("foo")));
        assert_eq!(check(Param::text("v"), json!(7)), Ok(json!("7")));
        assert!(check(Param::text("v"), json!({"a": 1})).is_err());

        assert_eq!(check(Param::float("v"), json!(1)), Ok(json!(1.0)));
        assert_eq!(check(Param::float("v"), json!("2.5")), Ok(json!(2.5)));

        assert_eq!(check(Param::boolean("v"), json!("Yes")), Ok(json!(true)));
        assert_eq!(check(Param::boolean("v"), json!(0)), Ok(json!(false)));
        assert_eq!(check(Param::boolean("v"), json!("maybe")).unwrap_err().kind, "type_error.bool");

        assert_eq!(check(Param::json("v"), json!([1, 2])), Ok(json!([1, 2])));
    }

    #[test]
    fn test_missing_and_null() {
        let err = TypeCoercion.validate(&Param::text("item_id"), None).unwrap_err();
        assert_eq!(err.kind, "value_error.missing");

        assert_eq!(TypeCoercion.validate(&Param::text("item_id").optional(), None), Ok(Value::Null));
        assert_eq!(
            check(Param::text("item_id"), Value::Null).unwrap_err().kind,
            "type_error.none.not_allowed"
        );
        assert_eq!(check(Param::text("item_id").optional(), Value::Null), Ok(Value::Null));
    }
}
