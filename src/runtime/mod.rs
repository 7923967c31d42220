//! Runtime subsystem.
//!
//! # Data Flow
//! ```text
//! Raw payload
//!     → App::invoke
//!     → event::adapt
//!         single → Pipeline::respond → ResponseEnvelope → JSON
//!         batch  → BatchProcessor → Pipeline::process per record
//!                → BatchReport → aggregate JSON
//! ```
//!
//! # Design Decisions
//! - The App is an explicit value; no global handler state
//! - Router, settings and sinks are fixed at `build()`

pub mod app;
pub mod diagnostics;
pub mod pipeline;

pub use app::{App, AppBuilder, InvokeError};
pub use diagnostics::diagnostic_routes;
pub use pipeline::Pipeline;
