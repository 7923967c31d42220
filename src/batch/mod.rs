//! Batch subsystem.
//!
//! # Data Flow
//! ```text
//! Record { id, Request }[]
//!     → processor.rs (bounded buffer_unordered over the records)
//!         → Pipeline::process per record (own deadline, own LogEntry)
//!     → BatchOutcome[] in record order
//!     → BatchSource::aggregate (failed ids only)
//! ```

pub mod processor;

pub use processor::{BatchOutcome, BatchProcessor, BatchReport};
