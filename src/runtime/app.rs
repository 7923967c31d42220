//! Application composition root.
//!
//! # Responsibilities
//! - Own the frozen router, settings, sinks and the resource cache
//! - Turn one raw invocation payload into one output value
//!
//! # Design Decisions
//! - Built once at process start and passed around explicitly
//! - Unhandled errors escape `invoke` for single requests only; batch
//!   records recover them

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::batch::{BatchProcessor, BatchReport};
use crate::binding::{ParameterBinder, SchemaValidator};
use crate::config::{RuntimeConfig, Settings};
use crate::dispatch::Dispatcher;
use crate::error::UnhandledError;
use crate::event::{adapt, BatchSource, EventError, Invocation, Record};
use crate::http::render::{CompactJson, JsonEncoder, ResponseEnvelope, ResponseRenderer};
use crate::http::request::Request;
use crate::lifecycle::{ResourceCache, Shutdown};
use crate::observability::{metrics, AccessLogger, LogSink, TracingSink};
use crate::routing::{RegistrationError, Route, RouterBuilder};
use crate::runtime::pipeline::Pipeline;

/// Invocation failures surfaced to the host.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The payload matched no known shape.
    #[error(transparent)]
    Event(#[from] EventError),

    /// A single request failed in a way no response describes.
    #[error("unhandled error: {}", .0.report())]
    Unhandled(#[from] UnhandledError),
}

/// A configured request-handling runtime.
#[derive(Debug)]
pub struct App {
    pipeline: Pipeline,
    batch: BatchProcessor,
    settings: Settings,
    server_id: String,
    resources: ResourceCache,
    shutdown: Shutdown,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::default()
    }

    /// Handle one raw invocation payload.
    pub async fn invoke(&self, payload: &Value) -> Result<Value, InvokeError> {
        let invocation = adapt(payload).inspect_err(|e| {
            tracing::error!(error = %e, "Rejected invocation payload");
        })?;

        match invocation {
            Invocation::Single { request, format } => {
                metrics::record_invocation("single");
                let envelope = self.respond(request).await?;
                Ok(envelope.to_json(format))
            }
            Invocation::Batch { source, records } => {
                metrics::record_invocation("batch");
                Ok(self.process_batch(source, records).await.to_json())
            }
        }
    }

    /// Handle one request and render its envelope.
    pub async fn respond(&self, request: Request) -> Result<ResponseEnvelope, UnhandledError> {
        self.pipeline.respond(request).await
    }

    pub async fn process_batch(&self, source: BatchSource, records: Vec<Record>) -> BatchReport {
        self.batch.process(&self.pipeline, source, records).await
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Cold-start resources shared by every invocation.
    pub fn resources(&self) -> &ResourceCache {
        &self.resources
    }

    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Signal shutdown and release scoped resources.
    pub async fn close(&self) -> usize {
        self.shutdown.trigger();
        let released = self.resources.close().await;
        tracing::info!(released, "Application closed");
        released
    }
}

/// Builder for [`App`].
#[derive(Debug)]
pub struct AppBuilder {
    routes: RouterBuilder,
    settings: Settings,
    sink: Arc<dyn LogSink>,
    validator: Option<Arc<dyn SchemaValidator>>,
    encoder: Arc<dyn JsonEncoder>,
    concurrency: usize,
    server_id: Option<String>,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self {
            routes: RouterBuilder::new(),
            settings: Settings::default(),
            sink: Arc::new(TracingSink),
            validator: None,
            encoder: Arc::new(CompactJson),
            concurrency: BatchProcessor::default().concurrency(),
            server_id: None,
        }
    }
}

impl AppBuilder {
    /// Settings, batch concurrency and server id from a loaded config.
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            settings: Settings::from(&config.settings),
            concurrency: config.batch.concurrency,
            server_id: config.server_id.clone(),
            ..Self::default()
        }
    }

    pub fn route(mut self, route: Route) -> Result<Self, RegistrationError> {
        self.routes.add(route)?;
        Ok(self)
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn json_encoder(mut self, encoder: Arc<dyn JsonEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    /// Records in flight per batch; 1 is sequential.
    pub fn batch_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn server_id(mut self, server_id: impl Into<String>) -> Self {
        self.server_id = Some(server_id.into());
        self
    }

    pub fn build(self) -> App {
        let router = Arc::new(self.routes.build());
        let server_id = self.server_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let dispatcher = Dispatcher::new(ParameterBinder::new(self.validator), self.settings.function_timeout());
        let batch = BatchProcessor::new(self.concurrency);

        tracing::info!(
            server_id = %server_id,
            routes = router.len(),
            function_timeout = ?self.settings.function_timeout(),
            batch_concurrency = batch.concurrency(),
            "Application ready"
        );

        let pipeline = Pipeline::new(
            router,
            dispatcher,
            ResponseRenderer::new(self.encoder),
            AccessLogger::new(self.sink, server_id.as_str()),
        );

        App {
            pipeline,
            batch,
            settings: self.settings,
            server_id,
            resources: ResourceCache::new(),
            shutdown: Shutdown::new(),
        }
    }
}
