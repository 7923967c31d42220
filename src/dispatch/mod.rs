//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Request
//!     → Router::lookup (miss: RouteNotFound)
//!     → ParameterBinder (failure: Validation or 422 Handler)
//!     → CancelScope::run(handler) (expiry: DeadlineExceeded)
//!     → Outcome (tagged: Completed | RouteNotFound | Validation
//!                        | Handler | DeadlineExceeded | Unhandled)
//! ```

pub mod dispatcher;
pub mod outcome;

pub use dispatcher::Dispatcher;
pub use outcome::Outcome;
