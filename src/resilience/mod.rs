//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Handler call:
//!     → timeouts.rs (CancelScope bounds the call by the function timeout)
//!     → On expiry: cancellation signalled, DeadlineExceeded returned
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every handler call has a deadline
//! - Nothing is retried here; redelivery belongs to the host

pub mod timeouts;

pub use timeouts::{CancelScope, CancelSignal, DeadlineExceeded};
