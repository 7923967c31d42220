//! Parameter binding subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration:
//!     Param[] (name, kind, required) stored on the Route
//!
//! Per request:
//!     Request + Param[]
//!     → binder.rs (inject Request/Response, read JSON body keys)
//!     → schema.rs (optional validation/coercion)
//!     → Args handed to the handler, or a 422 outcome
//! ```

pub mod args;
pub mod binder;
pub mod params;
pub mod schema;

pub use args::{Arg, Args};
pub use binder::ParameterBinder;
pub use params::{Param, ParamKind, ParamType};
pub use schema::{SchemaValidator, TypeCoercion};
