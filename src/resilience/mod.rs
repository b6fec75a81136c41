//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Handler invocation:
//!     → timeouts.rs (one deadline around every attempt)
//!         → retries.rs (retry transient failures with backoff.rs delays)
//!             → bridge
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every invocation has a deadline
//! - Retries only for failures where the handler never ran

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{is_retryable, RetryPolicy};
pub use timeouts::with_timeout;
