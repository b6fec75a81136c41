//! Language runtime bridge.
//!
//! # Data Flow
//! ```text
//! EntryPoint + RequestEnvelope
//!     → runtime.rs (RuntimeBridge: pick by module kind)
//!         → native.rs  (Rust closure on the blocking pool)
//!         → process.rs (interpreter child process + language shim)
//!     → HandlerResult | InvocationError
//! ```
//!
//! # Design Decisions
//! - The router depends on the `InvocationBridge` trait only; every handler is
//!   invoked through the same contract whatever its language
//! - Marshalling to and from a foreign representation is the bridge's job
//! - Cancellation is by drop: abandoning the future reclaims the invocation

use std::time::Duration;

use async_trait::async_trait;

use crate::envelope::{HandlerResult, RequestEnvelope};
use crate::handler::EntryPoint;

pub mod native;
pub mod process;
pub mod runtime;

pub use native::NativeBridge;
pub use process::ProcessBridge;
pub use runtime::RuntimeBridge;

/// Failures surfaced by a bridge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvocationError {
    /// The invocation did not finish within its deadline.
    #[error("invocation timed out after {0:?}")]
    Timeout(Duration),

    /// The handler raised, panicked or its process exited abnormally.
    #[error("handler crashed: {0}")]
    Crashed(String),

    /// The bridge got a return value it could not marshal back.
    #[error("handler returned a malformed result: {0}")]
    MalformedResult(String),

    /// The bridge itself hiccupped (e.g. could not spawn a process). Safe to retry.
    #[error("transient bridge failure: {0}")]
    Transient(String),
}

impl InvocationError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            InvocationError::Timeout(_) => "timeout",
            InvocationError::Crashed(_) => "crashed",
            InvocationError::MalformedResult(_) => "malformed",
            InvocationError::Transient(_) => "transient",
        }
    }
}

/// Executes one handler entry point.
#[async_trait]
pub trait InvocationBridge: Send + Sync {
    /// Invoke `entry` with `request` and return the raw handler result.
    async fn invoke(
        &self,
        entry: &EntryPoint,
        request: RequestEnvelope,
    ) -> Result<HandlerResult, InvocationError>;
}
