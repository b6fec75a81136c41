//! Polyglot file-based API router library.
//!
//! Resolves HTTP requests against a table of handler modules discovered from
//! a directory tree, calls the method-named function of the matching module
//! through a language bridge, and normalizes its result to `{status, body}`.

pub mod bridge;
pub mod config;
pub mod envelope;
pub mod handler;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod router;
pub mod routing;

pub use config::RouterConfig;
pub use envelope::{HandlerResult, RawRequest, RequestEnvelope, ResponseEnvelope};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use router::{Router, RouterError};
pub use routing::{RouteTable, SharedRoutes};
