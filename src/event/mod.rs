//! Event normalization subsystem.
//!
//! # Data Flow
//! ```text
//! Raw invocation payload (serde_json::Value)
//!     → adapter.rs (classify: single or batch)
//!         single → Request + envelope format
//!         batch  → sources.rs (per-source record extraction)
//!                → Record { id, Request }[]
//!     → Unrecognized shape: EventError (fatal)
//! ```

pub mod adapter;
pub mod sources;

pub use adapter::{adapt, EventError, Invocation, Record};
pub use sources::BatchSource;
