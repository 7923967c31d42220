//! Deadline-bounded handler execution.
//!
//! # Responsibilities
//! - Bind arguments and run the handler under a [`CancelScope`]
//! - Classify every exit into an [`Outcome`]
//! - Shape normal returns into a [`Response`]
//!
//! # Design Decisions
//! - Panics are caught and classified as unhandled, never propagated as panics
//! - Cancellation is cooperative: a handler that never yields runs to
//!   completion, and its late result is discarded
//! - No retries at this layer

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use futures_util::FutureExt;

use crate::binding::ParameterBinder;
use crate::dispatch::outcome::Outcome;
use crate::error::UnhandledError;
use crate::http::request::Request;
use crate::http::response::{Response, ResponseHandle};
use crate::resilience::CancelScope;
use crate::routing::{Reply, Route, Router};

/// Runs handlers for requests.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    binder: ParameterBinder,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(binder: ParameterBinder, timeout: Duration) -> Self {
        Self { binder, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Look the request up and run its handler.
    pub async fn dispatch(&self, router: &Router, request: Arc<Request>) -> Outcome {
        match router.lookup(request.method(), request.path()) {
            Some(route) => self.run(route, request).await,
            None => Outcome::RouteNotFound,
        }
    }

    /// Run `route`'s handler for `request`.
    pub async fn run(&self, route: &Route, request: Arc<Request>) -> Outcome {
        let handle = ResponseHandle::new(route.default_status());
        let scope = CancelScope::new(self.timeout);

        let args = match self.binder.bind(route.params(), &request, &handle, scope.signal()) {
            Ok(args) => args,
            Err(error) => return error.into(),
        };

        // Starting the handler may itself panic before the first poll.
        let call = match std::panic::catch_unwind(AssertUnwindSafe(|| route.call(args))) {
            Ok(call) => call,
            Err(panic) => return Outcome::Unhandled(UnhandledError::Panic(panic_message(panic))),
        };

        match scope.run(AssertUnwindSafe(call).catch_unwind()).await {
            Err(deadline) => {
                tracing::debug!(
                    request_id = %request.correlation_id(),
                    timeout = ?deadline.0,
                    "Handler cancelled at deadline"
                );
                Outcome::DeadlineExceeded(deadline)
            }
            Ok(Err(panic)) => Outcome::Unhandled(UnhandledError::Panic(panic_message(panic))),
            Ok(Ok(Err(error))) => error.into(),
            Ok(Ok(Ok(reply))) => Outcome::Completed(shape(reply, &handle)),
        }
    }
}

/// Build the response for a normal return.
fn shape(reply: Reply, handle: &ResponseHandle) -> Response {
    let mut response = match reply {
        Reply::Response(response) => return response,
        Reply::Empty if handle.status_set() => Response::new(handle.status()),
        Reply::Empty => Response::new(StatusCode::NO_CONTENT),
        Reply::Json(value) => Response::json(value).with_status(handle.status()),
    };
    response.headers_mut().extend(handle.headers());
    response
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(message) => *message,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(message) => (*message).to_string(),
            Err(_) => "non-string panic payload".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{Param, TypeCoercion};
    use crate::error::{HandlerError, RouteError};
    use crate::http::response::Content;
    use axum::http::Method;
    use serde_json::{json, Value};

    fn dispatcher(timeout: Duration) -> Dispatcher {
        Dispatcher::new(ParameterBinder::new(Some(Arc::new(TypeCoercion))), timeout)
    }

    fn request(method: Method, path: &str, body: Option<Value>) -> Arc<Request> {
        let mut builder = Request::builder(method, path);
        if let Some(body) = body {
            builder = builder.body(body.to_string());
        }
        Arc::new(builder.build())
    }

    fn router() -> Router {
        Router::builder()
            .route(Route::get("/empty", |_args| async { Ok::<_, RouteError>(()) }))
            .unwrap()
            .route(
                Route::post("/item", |args| async move {
                    let item_id: String = args.get("item_id")?;
                    Ok::<_, RouteError>(json!({"item_id": item_id}))
                })
                .status_code(StatusCode::CREATED)
                .param(Param::text("item_id")),
            )
            .unwrap()
            .route(
                Route::get("/status", |args| async move {
                    if let Some(response) = args.response("response") {
                        response.set_status(StatusCode::ACCEPTED);
                        response.insert_header("x-custom", "1");
                    }
                    Ok::<_, RouteError>(())
                })
                .param(Param::response("response")),
            )
            .unwrap()
            .route(Route::get("/error", |_args| async {
                Err::<(), _>(HandlerError::new(StatusCode::NOT_FOUND).into())
            }))
            .unwrap()
            .route(Route::get("/panic", |_args| async {
                if true {
                    panic!("handler exploded");
                }
                Ok::<_, RouteError>(())
            }))
            .unwrap()
            .route(Route::get("/slow", |_args| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, RouteError>(())
            }))
            .unwrap()
            .route(Route::get("/blocking", |_args| async {
                std::thread::sleep(Duration::from_millis(80));
                Ok::<_, RouteError>(())
            }))
            .unwrap()
            .build()
    }

    #[tokio::test]
    async fn test_empty_reply_is_204() {
        let outcome = dispatcher(Duration::from_secs(1))
            .dispatch(&router(), request(Method::GET, "/empty", None))
            .await;
        let response = outcome.into_response().unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.content(), &Content::Empty);
    }

    #[tokio::test]
    async fn test_json_reply_uses_route_status() {
        let outcome = dispatcher(Duration::from_secs(1))
            .dispatch(&router(), request(Method::POST, "/item", Some(json!({"item_id": "foo"}))))
            .await;
        let response = outcome.into_response().unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.content(), &Content::Json(json!({"item_id": "foo"})));
    }

    #[tokio::test]
    async fn test_injected_response_status_is_kept() {
        let outcome = dispatcher(Duration::from_secs(1))
            .dispatch(&router(), request(Method::GET, "/status", None))
            .await;
        let response = outcome.into_response().unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers().get("x-custom").map(String::as_str), Some("1"));
    }

    #[tokio::test]
    async fn test_classification() {
        let dispatcher = dispatcher(Duration::from_secs(1));
        let router = router();

        let outcome = dispatcher.dispatch(&router, request(Method::GET, "/missing", None)).await;
        assert!(matches!(outcome, Outcome::RouteNotFound));

        let outcome = dispatcher.dispatch(&router, request(Method::POST, "/item", Some(json!({})))).await;
        assert!(matches!(outcome, Outcome::Validation(_)));

        let outcome = dispatcher.dispatch(&router, request(Method::GET, "/error", None)).await;
        assert!(matches!(outcome, Outcome::Handler(ref e) if e.status() == StatusCode::NOT_FOUND));

        let outcome = dispatcher.dispatch(&router, request(Method::GET, "/panic", None)).await;
        assert!(matches!(outcome, Outcome::Unhandled(UnhandledError::Panic(ref m)) if m == "handler exploded"));
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let dispatcher = dispatcher(Duration::from_millis(20));
        let router = router();

        let outcome = dispatcher.dispatch(&router, request(Method::GET, "/slow", None)).await;
        assert!(matches!(outcome, Outcome::DeadlineExceeded(_)));

        let outcome = dispatcher.dispatch(&router, request(Method::GET, "/blocking", None)).await;
        assert!(matches!(outcome, Outcome::DeadlineExceeded(_)));
    }
}
