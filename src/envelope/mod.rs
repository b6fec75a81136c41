//! Request and response envelopes.
//!
//! # Data Flow
//! ```text
//! RawRequest (transport) + path params (matcher)
//!     → request.rs (RequestEnvelope: url, headers, method, body, params, query)
//!     → handler invocation (any language)
//!     → HandlerResult (structured value or JSON string)
//!     → response.rs (normalize → ResponseEnvelope {status, body})
//! ```

pub mod headers;
pub mod query;
pub mod request;
pub mod response;

pub use headers::Headers;
pub use query::{Query, QueryValue};
pub use request::{Params, RawRequest, RequestEnvelope};
pub use response::{normalize, HandlerResult, NormalizeError, ResponseEnvelope};
