//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → CLI overrides applied in main
//!     → handed to router, bridge, transport and observability at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ErrorsConfig, InvocationConfig, ListenerConfig, ObservabilityConfig, RetryConfig,
    RouterConfig, RoutesConfig, RuntimeCommand, RuntimesConfig,
};
pub use validation::{validate_config, ValidationError};
