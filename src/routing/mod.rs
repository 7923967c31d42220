//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Process setup:
//!     Route (method, path, handler, default status, params)
//!     → RouterBuilder (reject duplicates)
//!     → build() freezes an immutable Router
//!
//! Per request:
//!     (method, path) → Router::lookup → Route or no match (404)
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - Exact match only: no wildcards, no path parameters
//! - Deterministic: same input always matches same route

pub mod route;
pub mod router;

pub use route::{Handler, Reply, Route};
pub use router::{RegistrationError, Router, RouterBuilder};
