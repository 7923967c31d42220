//! Local HTTP runner.
//!
//! # Responsibilities
//! - Serve the application over real HTTP for local development
//! - Translate each HTTP request into a single-request invocation
//! - Translate the rendered envelope back into an HTTP response
//!
//! # Design Decisions
//! - Every path goes to one fallback handler; routing stays in the App
//! - Middleware from tower-http: tracing, request id, body limit
//! - Unhandled errors become a bare 500 with no detail

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request as HttpRequest, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response as HttpResponse},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::render::ResponseEnvelope;
use crate::http::request::Request;
use crate::lifecycle::Shutdown;
use crate::runtime::App;

/// HTTP front end for an [`App`].
pub struct HttpServer {
    router: Router,
    app: Arc<App>,
}

impl HttpServer {
    pub fn new(app: Arc<App>, config: &ServerConfig) -> Self {
        let router = Self::build_router(app.clone(), config);
        Self { router, app }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(app: Arc<App>, config: &ServerConfig) -> Router {
        Router::new()
            .fallback(invoke_handler)
            .with_state(app)
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown` triggers.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            server_id = %self.app.server_id(),
            "HTTP server starting"
        );

        let mut stop = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn invoke_handler(State(app): State<Arc<App>>, request: HttpRequest) -> HttpResponse {
    let (parts, body) = request.into_parts();

    // The body limit layer caps the stream; exceeding it surfaces here.
    let body = match to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|value| (name.as_str().to_string(), value.to_string())));

    let mut builder = Request::builder(parts.method, parts.uri.path()).headers(headers);
    if !body.is_empty() {
        builder = builder.body(body.to_vec());
    }

    match app.respond(builder.build()).await {
        Ok(envelope) => into_http(envelope),
        Err(error) => {
            tracing::error!(error = %error.report(), "Unhandled error");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn into_http(envelope: ResponseEnvelope) -> HttpResponse {
    let body = match envelope.decoded_body() {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "Rendered body is not valid base64");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let status = StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, Body::from(body)).into_response();

    let headers = response.headers_mut();
    for (name, value) in &envelope.headers {
        match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Dropping invalid response header"),
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RouteError;
    use crate::routing::Route;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use std::collections::BTreeMap;

    #[test]
    fn test_binary_envelope_is_decoded() {
        let envelope = ResponseEnvelope {
            status_code: 200,
            headers: BTreeMap::from([("content-type".to_string(), "application/octet-stream".to_string())]),
            body: STANDARD.encode([1u8, 2, 3]),
            is_binary: true,
        };
        let response = into_http(envelope);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/octet-stream");
    }

    #[tokio::test]
    async fn test_router_builds() {
        let app = App::builder()
            .route(Route::get("/ping", |_args| async { Ok::<_, RouteError>(()) }))
            .unwrap()
            .build();
        let server = HttpServer::new(Arc::new(app), &ServerConfig::default());
        let _ = server.router();
    }
}
