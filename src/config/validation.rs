//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, concurrency >= 1)
//! - Check the local runner address parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RuntimeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RuntimeConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &RuntimeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let settings = &config.settings;
    for (field, value) in [
        ("settings.function_timeout_secs", settings.function_timeout_secs),
        ("settings.connection_timeout_secs", settings.connection_timeout_secs),
        ("settings.read_timeout_secs", settings.read_timeout_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }

    if config.batch.concurrency == 0 {
        errors.push(ValidationError::new("batch.concurrency", "must be at least 1"));
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("invalid socket address '{}'", config.server.bind_address),
        ));
    }

    if config.server.max_body_bytes == 0 {
        errors.push(ValidationError::new("server.max_body_bytes", "must be greater than zero"));
    }

    if matches!(config.server_id.as_deref(), Some(id) if id.trim().is_empty()) {
        errors.push(ValidationError::new("server_id", "must not be blank"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
