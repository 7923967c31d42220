//! Invocation Router Library
//!
//! HTTP-style routing over function invocation events: single requests and
//! record batches are normalized, routed, bound, dispatched under a
//! deadline and rendered back into the host's envelope.

pub mod batch;
pub mod binding;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod runtime;

pub use binding::{Args, Param};
pub use config::{RuntimeConfig, Settings};
pub use error::{HandlerError, RouteError};
pub use http::{Request, Response, ResponseHandle};
pub use lifecycle::Shutdown;
pub use routing::{Reply, Route};
pub use runtime::{App, AppBuilder, InvokeError};
