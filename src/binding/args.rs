//! Bound argument set handed to a handler.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{FieldError, RouteError, ValidationErrors};
use crate::http::request::Request;
use crate::http::response::ResponseHandle;
use crate::resilience::CancelSignal;

/// One resolved argument.
#[derive(Debug, Clone)]
pub enum Arg {
    Request(Arc<Request>),
    Response(ResponseHandle),
    Value(Value),
}

/// Arguments resolved from a request, keyed by declared parameter name.
#[derive(Debug, Clone)]
pub struct Args {
    values: HashMap<String, Arg>,
    cancel: CancelSignal,
}

impl Args {
    pub fn new(values: HashMap<String, Arg>, cancel: CancelSignal) -> Self {
        Self { values, cancel }
    }

    pub fn request(&self, name: &str) -> Option<Arc<Request>> {
        match self.values.get(name) {
            Some(Arg::Request(request)) => Some(request.clone()),
            _ => None,
        }
    }

    pub fn response(&self, name: &str) -> Option<ResponseHandle> {
        match self.values.get(name) {
            Some(Arg::Response(handle)) => Some(handle.clone()),
            _ => None,
        }
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.values.get(name) {
            Some(Arg::Value(value)) => Some(value),
            _ => None,
        }
    }

    /// Deserialize a value parameter. Absent parameters read as `null`, so
    /// `Option<T>` suits optional ones.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, RouteError> {
        let value = match self.values.get(name) {
            Some(Arg::Value(value)) => value.clone(),
            None => Value::Null,
            Some(_) => {
                return Err(RouteError::unhandled(format!("parameter '{name}' is not a value parameter")));
            }
        };

        serde_json::from_value(value).map_err(|e| {
            ValidationErrors::from(FieldError::new(name, e.to_string(), "type_error")).into()
        })
    }

    /// Cancellation signal of the running dispatch.
    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args() -> Args {
        let values = HashMap::from([
            ("item_id".to_string(), Arg::Value(json!("foo"))),
            ("count".to_string(), Arg::Value(json!(3))),
            ("response".to_string(), Arg::Response(ResponseHandle::default())),
        ]);
        Args::new(values, CancelSignal::never())
    }

    #[test]
    fn test_typed_access() {
        let args = args();
        assert_eq!(args.get::<String>("item_id").unwrap(), "foo");
        assert_eq!(args.get::<u32>("count").unwrap(), 3);
        assert_eq!(args.get::<Option<String>>("absent").unwrap(), None);
        assert!(args.response("response").is_some());
        assert!(args.request("response").is_none());
    }

    #[test]
    fn test_type_mismatch_is_validation_error() {
        let err = args().get::<u32>("item_id").unwrap_err();
        assert!(matches!(err, RouteError::Validation(ref e) if e.errors[0].loc == vec!["item_id".to_string()]));

        let err = args().get::<String>("response").unwrap_err();
        assert!(matches!(err, RouteError::Unhandled(_)));
    }
}
