//! Per-request pipeline: access log, dispatch, render.

use std::sync::Arc;
use std::time::Instant;

use crate::dispatch::{Dispatcher, Outcome};
use crate::error::UnhandledError;
use crate::http::render::{ResponseEnvelope, ResponseRenderer};
use crate::http::request::Request;
use crate::observability::{metrics, AccessLogger};
use crate::routing::Router;

/// Everything one request passes through.
#[derive(Debug, Clone)]
pub struct Pipeline {
    router: Arc<Router>,
    dispatcher: Dispatcher,
    renderer: ResponseRenderer,
    logger: AccessLogger,
}

impl Pipeline {
    pub fn new(router: Arc<Router>, dispatcher: Dispatcher, renderer: ResponseRenderer, logger: AccessLogger) -> Self {
        Self {
            router,
            dispatcher,
            renderer,
            logger,
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Dispatch `request` and log its outcome exactly once.
    pub async fn process(&self, request: Request) -> Outcome {
        let started = Instant::now();
        let request = Arc::new(request);
        let log = self.logger.start(&request);

        let outcome = self.dispatcher.dispatch(&self.router, request.clone()).await;

        log.finish(&outcome);
        metrics::record_request(request.method().as_str(), outcome.status().as_u16(), outcome.kind(), started);
        outcome
    }

    /// Process and render a single request. Unhandled failures are returned
    /// as errors, already logged.
    pub async fn respond(&self, request: Request) -> Result<ResponseEnvelope, UnhandledError> {
        let correlation_id = request.correlation_id().to_string();
        let response = self.process(request).await.into_response()?;
        Ok(self.renderer.render(response, &correlation_id))
    }
}
