//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Cold start (resources.rs):
//!     get_or_init(key, init) → run once, share the result
//!     enter(key, acquire, release) → keep open, release on close
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger → server drains
//!     → App::close → ResourceCache::close (reverse order)
//! ```
//!
//! # Design Decisions
//! - Initialization work happens outside any request deadline
//! - Release at shutdown is attempted, not guaranteed: the host may freeze
//!   or kill the process first

pub mod resources;
pub mod shutdown;
pub mod signals;

pub use resources::{ResourceCache, ResourceError};
pub use shutdown::Shutdown;
pub use signals::{shutdown_signal, spawn_signal_listener};
