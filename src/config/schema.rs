//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the runtime.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the invocation runtime.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Timeouts handed to the dispatcher and to SDK clients.
    pub settings: SettingsConfig,

    /// Batch processing policy.
    pub batch: BatchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Local HTTP runner settings.
    pub server: ServerConfig,

    /// Identifier reported as `server_id` in access logs.
    /// A random UUID is used when unset.
    pub server_id: Option<String>,
}

/// Timeout settings, in whole seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Deadline for a single handler execution.
    /// Keep it below the host's own function timeout.
    pub function_timeout_secs: u64,

    /// Connection establishment timeout for outbound clients.
    pub connection_timeout_secs: u64,

    /// Read timeout for outbound clients.
    pub read_timeout_secs: u64,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            function_timeout_secs: 30,
            connection_timeout_secs: 5,
            read_timeout_secs: 15,
        }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of records processed at the same time.
    /// `1` processes records strictly in order.
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { concurrency: 16 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human readable, for local development.
    Pretty,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
        }
    }
}

/// Local HTTP runner configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:9000").
    pub bind_address: String,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:9000".to_string(),
            max_body_bytes: 6 * 1024 * 1024, // host payload limit
        }
    }
}

/// Resolved timeout settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    function_timeout: Duration,
    connection_timeout: Duration,
    read_timeout: Duration,
}

impl Settings {
    pub fn new(function_timeout: Duration, connection_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            function_timeout,
            connection_timeout,
            read_timeout,
        }
    }

    /// Deadline applied to every handler execution.
    pub fn function_timeout(&self) -> Duration {
        self.function_timeout
    }

    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Replace the handler deadline.
    pub fn with_function_timeout(mut self, timeout: Duration) -> Self {
        self.function_timeout = timeout;
        self
    }
}

impl From<&SettingsConfig> for Settings {
    fn from(config: &SettingsConfig) -> Self {
        Self::new(
            Duration::from_secs(config.function_timeout_secs),
            Duration::from_secs(config.connection_timeout_secs),
            Duration::from_secs(config.read_timeout_secs),
        )
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&SettingsConfig::default())
    }
}
