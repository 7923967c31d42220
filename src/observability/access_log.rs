//! Access logging.
//!
//! # Responsibilities
//! - Build one [`LogEntry`] per processed request or batch record
//! - Hand entries to a pluggable [`LogSink`]
//!
//! # Design Decisions
//! - Emission is tied to an RAII guard: finishing it logs the outcome,
//!   dropping it unfinished logs a critical 500. Either way, exactly once
//! - Unhandled failures are logged here before they propagate

use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use crate::dispatch::Outcome;
use crate::http::request::Request;

/// Severity of an access log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Level for a plain status code.
    pub fn for_status(status: u16) -> Self {
        match status {
            0..=399 => LogLevel::Info,
            400..=499 => LogLevel::Warning,
            _ => LogLevel::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        }
    }
}

/// One structured access log record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub method: String,
    pub path: String,
    pub id: String,
    /// Seconds.
    pub execution_time: f64,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<Value>,
    pub server_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Destination for access log entries.
pub trait LogSink: Send + Sync + Debug {
    fn emit(&self, entry: &LogEntry);
}

/// Emits entries as `tracing` events on the `access` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, entry: &LogEntry) {
        let error_detail = entry.error_detail.as_ref().map(|detail| match detail {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });

        macro_rules! access {
            ($macro:ident) => {
                tracing::$macro!(
                    target: "access",
                    log_level = entry.level.as_str(),
                    method = %entry.method,
                    path = %entry.path,
                    id = %entry.id,
                    execution_time = entry.execution_time,
                    status_code = entry.status_code,
                    error_detail = error_detail.as_deref(),
                    server_id = %entry.server_id,
                    user_agent = entry.user_agent.as_deref(),
                )
            };
        }

        match entry.level {
            LogLevel::Info => access!(info),
            LogLevel::Warning => access!(warn),
            LogLevel::Error | LogLevel::Critical => access!(error),
        }
    }
}

/// Keeps entries in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_else(|p| p.into_inner().clone())
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for MemorySink {
    fn emit(&self, entry: &LogEntry) {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.push(entry.clone());
    }
}

/// Creates access log guards bound to one sink and server id.
#[derive(Debug, Clone)]
pub struct AccessLogger {
    sink: Arc<dyn LogSink>,
    server_id: Arc<str>,
}

impl AccessLogger {
    pub fn new(sink: Arc<dyn LogSink>, server_id: impl Into<Arc<str>>) -> Self {
        Self {
            sink,
            server_id: server_id.into(),
        }
    }

    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    /// Start timing `request`.
    pub fn start(&self, request: &Request) -> AccessLog {
        AccessLog {
            sink: self.sink.clone(),
            server_id: self.server_id.clone(),
            method: request.method().to_string(),
            path: request.path().to_string(),
            id: request.correlation_id().to_string(),
            user_agent: request.user_agent().map(str::to_string),
            started: Instant::now(),
            done: false,
        }
    }
}

/// Guard for one logical request. Emits exactly one entry.
#[derive(Debug)]
pub struct AccessLog {
    sink: Arc<dyn LogSink>,
    server_id: Arc<str>,
    method: String,
    path: String,
    id: String,
    user_agent: Option<String>,
    started: Instant,
    done: bool,
}

impl AccessLog {
    /// Log the outcome and consume the guard.
    pub fn finish(mut self, outcome: &Outcome) -> LogEntry {
        let entry = self.entry(outcome.level(), outcome.status().as_u16(), outcome.error_detail());
        self.emit(&entry);
        entry
    }

    fn entry(&self, level: LogLevel, status_code: u16, error_detail: Option<Value>) -> LogEntry {
        LogEntry {
            level,
            method: self.method.clone(),
            path: self.path.clone(),
            id: self.id.clone(),
            execution_time: self.started.elapsed().as_secs_f64(),
            status_code,
            error_detail,
            server_id: self.server_id.to_string(),
            user_agent: self.user_agent.clone(),
        }
    }

    fn emit(&mut self, entry: &LogEntry) {
        self.done = true;
        self.sink.emit(entry);
    }
}

impl Drop for AccessLog {
    fn drop(&mut self) {
        if !self.done {
            let detail = if std::thread::panicking() {
                "request aborted by panic"
            } else {
                "request dropped before completion"
            };
            let entry = self.entry(LogLevel::Critical, 500, Some(Value::from(detail)));
            self.emit(&entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::Response;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    fn logger(sink: &MemorySink) -> AccessLogger {
        AccessLogger::new(Arc::new(sink.clone()), "server-1")
    }

    fn request() -> Request {
        Request::builder(Method::GET, "/item")
            .header("x-request-id", "req-1")
            .header("user-agent", "tests")
            .build()
    }

    #[test]
    fn test_level_for_status() {
        assert_eq!(LogLevel::for_status(204), LogLevel::Info);
        assert_eq!(LogLevel::for_status(404), LogLevel::Warning);
        assert_eq!(LogLevel::for_status(504), LogLevel::Error);
    }

    #[test]
    fn test_finish_emits_once() {
        let sink = MemorySink::new();
        let log = logger(&sink).start(&request());

        let entry = log.finish(&Outcome::Completed(Response::new(StatusCode::NO_CONTENT)));

        assert_eq!(sink.entries(), vec![entry.clone()]);
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.status_code, 204);
        assert_eq!(entry.id, "req-1");
        assert_eq!(entry.server_id, "server-1");
        assert_eq!(entry.user_agent.as_deref(), Some("tests"));
    }

    #[test]
    fn test_drop_without_finish_emits_critical() {
        let sink = MemorySink::new();
        drop(logger(&sink).start(&request()));

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Critical);
        assert_eq!(entries[0].status_code, 500);
    }

    #[test]
    fn test_entry_serialization_skips_absent_fields() {
        let sink = MemorySink::new();
        let entry = logger(&sink)
            .start(&Request::builder(Method::POST, "/x").header("x-request-id", "a").build())
            .finish(&Outcome::RouteNotFound);

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["level"], json!("warning"));
        assert_eq!(value["status_code"], json!(404));
        assert!(value.get("error_detail").is_none());
        assert!(value.get("user_agent").is_none());
    }
}
