//! Route descriptors.
//!
//! A route owns its handler, its default status code and the parameter
//! descriptor list the binder consults.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Serialize;
use serde_json::Value;

use crate::binding::{Args, Param};
use crate::error::RouteError;
use crate::http::response::Response;

/// Value returned by a handler.
#[derive(Debug, Clone)]
pub enum Reply {
    /// No value: rendered as 204 unless the handler set a status.
    Empty,
    /// JSON content, rendered with the route's default status.
    Json(Value),
    /// A complete response, used verbatim.
    Response(Response),
}

impl Reply {
    /// Serialize any value as JSON content.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, RouteError> {
        serde_json::to_value(value)
            .map(Reply::Json)
            .map_err(RouteError::unhandled)
    }
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::Empty
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Json(value)
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply::Response(response)
    }
}

/// Type-erased async handler.
pub type Handler = Arc<dyn Fn(Args) -> BoxFuture<'static, Result<Reply, RouteError>> + Send + Sync>;

/// A registered (method, path) with its handler.
#[derive(Clone)]
pub struct Route {
    method: Method,
    path: String,
    handler: Handler,
    status_code: StatusCode,
    params: Vec<Param>,
}

impl Route {
    pub fn new<F, Fut, R>(method: Method, path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, RouteError>> + Send + 'static,
        R: Into<Reply>,
    {
        let handler: Handler = Arc::new(move |args| handler(args).map(|result| result.map(Into::into)).boxed());
        Self {
            method,
            path: path.into(),
            handler,
            status_code: StatusCode::OK,
            params: Vec::new(),
        }
    }

    pub fn get<F, Fut, R>(path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, RouteError>> + Send + 'static,
        R: Into<Reply>,
    {
        Self::new(Method::GET, path, handler)
    }

    pub fn post<F, Fut, R>(path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, RouteError>> + Send + 'static,
        R: Into<Reply>,
    {
        Self::new(Method::POST, path, handler)
    }

    pub fn put<F, Fut, R>(path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, RouteError>> + Send + 'static,
        R: Into<Reply>,
    {
        Self::new(Method::PUT, path, handler)
    }

    pub fn patch<F, Fut, R>(path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, RouteError>> + Send + 'static,
        R: Into<Reply>,
    {
        Self::new(Method::PATCH, path, handler)
    }

    pub fn delete<F, Fut, R>(path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, RouteError>> + Send + 'static,
        R: Into<Reply>,
    {
        Self::new(Method::DELETE, path, handler)
    }

    pub fn head<F, Fut, R>(path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, RouteError>> + Send + 'static,
        R: Into<Reply>,
    {
        Self::new(Method::HEAD, path, handler)
    }

    pub fn options<F, Fut, R>(path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, RouteError>> + Send + 'static,
        R: Into<Reply>,
    {
        Self::new(Method::OPTIONS, path, handler)
    }

    /// Default status for successful JSON replies.
    pub fn status_code(mut self, status: StatusCode) -> Self {
        self.status_code = status;
        self
    }

    /// Declare a handler parameter.
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn default_status(&self) -> StatusCode {
        self.status_code
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Start the handler with bound arguments.
    pub fn call(&self, args: Args) -> BoxFuture<'static, Result<Reply, RouteError>> {
        (self.handler)(args)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("status_code", &self.status_code)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
