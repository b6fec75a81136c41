//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files, and
//! every section has defaults so an empty file is a valid configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the router.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Where handler files are discovered and how they are mounted.
    pub routes: RoutesConfig,

    /// Per-invocation deadline.
    pub invocation: InvocationConfig,

    /// Retry configuration for transient bridge failures.
    pub retries: RetryConfig,

    /// Interpreter commands per script language.
    pub runtimes: RuntimesConfig,

    /// Caller-visible error reporting.
    pub errors: ErrorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,

    /// Largest accepted request body.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Route discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RoutesConfig {
    /// Directory scanned for handler files.
    pub directory: PathBuf,

    /// URL prefix every discovered route is mounted under.
    pub prefix: String,

    /// Rebuild the route table when the directory changes.
    pub watch: bool,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("api"),
            prefix: "/api".to_string(),
            watch: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct InvocationConfig {
    /// Deadline for one handler invocation, retries included.
    pub timeout_ms: u64,
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self { timeout_ms: 30_000 }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries of transient invocation failures.
    pub enabled: bool,

    /// Total attempts, the first one included.
    pub max_attempts: u32,

    /// Base delay for exponential backoff.
    pub base_delay_ms: u64,

    /// Upper bound for a single backoff delay.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 50,
            max_delay_ms: 1000,
        }
    }
}

/// An interpreter invocation: program plus leading arguments.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RuntimeCommand {
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,
}

impl RuntimeCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }
}

/// Interpreter commands used by the process bridge.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RuntimesConfig {
    pub javascript: RuntimeCommand,
    pub typescript: RuntimeCommand,
    pub python: RuntimeCommand,
    pub ruby: RuntimeCommand,
}

impl Default for RuntimesConfig {
    fn default() -> Self {
        Self {
            javascript: RuntimeCommand::new("node"),
            typescript: RuntimeCommand::new("tsx"),
            python: RuntimeCommand::new("python3"),
            ruby: RuntimeCommand::new("ruby"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ErrorsConfig {
    /// Include internal failure detail in error responses (development mode).
    pub expose_details: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
