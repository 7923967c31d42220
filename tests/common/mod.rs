//! Shared utilities for integration tests: payload builders and a test app.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};

use invocation_router::binding::{Param, TypeCoercion};
use invocation_router::http::response::Response;
use invocation_router::observability::MemorySink;
use invocation_router::{App, AppBuilder, HandlerError, RouteError, Route, Settings};

pub const BINARY: [u8; 6] = [0, 159, 146, 150, 255, 10];

/// Generic single-request payload.
pub fn single_event(method: &str, path: &str, body: Option<Value>) -> Value {
    let mut event = json!({
        "method": method,
        "path": path,
        "headers": {"User-Agent": "integration-tests"},
        "isBodyBinary": false,
    });
    if let Some(body) = body {
        event["body"] = Value::String(body.to_string());
    }
    event
}

/// API gateway HTTP API payload.
pub fn api_gateway_event(method: &str, path: &str, request_id: &str) -> Value {
    json!({
        "requestContext": {"http": {"method": method, "path": path}, "requestId": request_id},
        "headers": {},
        "isBase64Encoded": false,
    })
}

/// Generic batch payload; each record body is a serialized single payload.
pub fn batch_event(records: &[(&str, Value)]) -> Value {
    let records: Vec<Value> = records
        .iter()
        .map(|(id, event)| json!({"id": id, "body": event.to_string()}))
        .collect();
    json!({ "records": records })
}

/// Queue batch payload.
pub fn sqs_event(records: &[(&str, Value)]) -> Value {
    let records: Vec<Value> = records
        .iter()
        .map(|(id, event)| json!({"messageId": id, "body": event.to_string(), "eventSource": "aws:sqs"}))
        .collect();
    json!({ "Records": records })
}

/// App builder with the routes most tests need.
pub fn builder(sink: &MemorySink) -> AppBuilder {
    App::builder()
        .log_sink(Arc::new(sink.clone()))
        .validator(Arc::new(TypeCoercion))
        .server_id("test-server")
        .settings(Settings::default().with_function_timeout(Duration::from_millis(200)))
        .route(Route::get("/item", |_args| async { Ok::<_, RouteError>(json!({"item": "value"})) }))
        .unwrap()
        .route(
            Route::post("/item", |args| async move {
                let item_id: String = args.get("item_id")?;
                Ok::<_, RouteError>(json!({ "item_id": item_id }))
            })
            .status_code(StatusCode::CREATED)
            .param(Param::text("item_id")),
        )
        .unwrap()
        .route(Route::delete("/item", |_args| async { Ok::<_, RouteError>(()) }))
        .unwrap()
        .route(Route::get("/binary", |_args| async {
            Ok::<_, RouteError>(Response::binary(BINARY.to_vec(), "application/octet-stream"))
        }))
        .unwrap()
        .route(Route::get("/not-found", |_args| async {
            Err::<(), RouteError>(HandlerError::new(StatusCode::NOT_FOUND).into())
        }))
        .unwrap()
        .route(Route::get("/bad-request", |_args| async {
            Err::<(), RouteError>(
                HandlerError::new(StatusCode::BAD_REQUEST)
                    .with_detail("Custom Error Message")
                    .with_error_detail("operator only")
                    .into(),
            )
        }))
        .unwrap()
        .route(Route::get("/unhandled", |_args| async {
            Err::<(), RouteError>(RouteError::unhandled(std::io::Error::other("database unreachable")))
        }))
        .unwrap()
        .route(Route::get("/slow", |_args| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, RouteError>(())
        }))
        .unwrap()
        .route(Route::get("/spin", |_args| async {
            // Never yields: cannot be preempted, only discarded.
            std::thread::sleep(Duration::from_millis(300));
            Ok::<_, RouteError>(())
        }))
        .unwrap()
}

pub fn decode(body: &str) -> Vec<u8> {
    STANDARD.decode(body).unwrap()
}
