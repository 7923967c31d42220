//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (FUNCTION_TIMEOUT / CONNECTION_TIMEOUT / READ_TIMEOUT overrides)
//!     → validation.rs (semantic checks)
//!     → RuntimeConfig (validated, immutable)
//!     → Settings handed to the dispatcher
//! ```
//!
//! # Design Decisions
//! - Config is read once at process start; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{BatchConfig, LogFormat, ObservabilityConfig, RuntimeConfig, ServerConfig, Settings, SettingsConfig};
