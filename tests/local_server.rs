//! The local HTTP runner, exercised in-process.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use invocation_router::config::ServerConfig;
use invocation_router::http::HttpServer;
use invocation_router::observability::MemorySink;
use invocation_router::runtime::diagnostic_routes;

mod common;

fn server(sink: &MemorySink) -> axum::Router {
    let mut builder = common::builder(sink);
    for route in diagnostic_routes() {
        builder = builder.route(route).unwrap();
    }
    HttpServer::new(Arc::new(builder.build()), &ServerConfig::default()).router()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

#[tokio::test]
async fn test_health_and_request_id() {
    let sink = MemorySink::new();
    let response = server(&sink)
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "local-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "local-1");
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body, json!({"status": "ok"}));
    assert_eq!(sink.entries()[0].id, "local-1");
}

#[tokio::test]
async fn test_echo_binary() {
    let sink = MemorySink::new();
    let response = server(&sink)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/echo")
                .header("content-type", "application/octet-stream")
                .body(Body::from(common::BINARY.to_vec()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, common::BINARY.to_vec());
}

#[tokio::test]
async fn test_not_found_and_unhandled() {
    let sink = MemorySink::new();
    let router = server(&sink);

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(response).await.is_empty());

    let response = router
        .oneshot(Request::builder().uri("/unhandled").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_bytes(response).await.is_empty());

    assert_eq!(sink.len(), 2);
}
