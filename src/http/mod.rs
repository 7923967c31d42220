//! HTTP model and rendering subsystem.
//!
//! # Data Flow
//! ```text
//! EventAdapter / local server
//!     → request.rs (Request: lowercase headers, correlation id)
//!     → [dispatch produces a Response]
//!     → response.rs (Response, ResponseHandle defaults)
//!     → render.rs (ResponseEnvelope: base64 for binary, JSON encoder)
//!     → Host envelope, or server.rs turns it back into HTTP
//! ```

pub mod render;
pub mod request;
pub mod response;
pub mod server;

pub use render::{CompactJson, EnvelopeFormat, JsonEncoder, PrettyJson, ResponseEnvelope, ResponseRenderer};
pub use request::{Request, RequestBuilder, X_REQUEST_ID};
pub use response::{Content, Response, ResponseHandle};
pub use server::HttpServer;
