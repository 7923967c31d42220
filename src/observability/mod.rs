//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request or batch record:
//!     → access_log.rs (one LogEntry, always, via an RAII guard)
//!         → LogSink (tracing events by default)
//!     → metrics.rs (counters, histograms)
//!
//! Process start:
//!     → logging.rs (tracing subscriber: EnvFilter + JSON or pretty fmt)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Correlation id in every access log entry
//! - Metrics are cheap (atomic increments)

pub mod access_log;
pub mod logging;
pub mod metrics;

pub use access_log::{AccessLog, AccessLogger, LogEntry, LogLevel, LogSink, MemorySink, TracingSink};
pub use logging::init_logging;
