//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request ID, trace, body limit)
//!     → request.rs (HTTP request → RawRequest)
//!     → router (resolve, dispatch, invoke, normalize)
//!     → server.rs (ResponseEnvelope → status + JSON body)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{into_raw_request, RequestError, UuidRequestId, X_REQUEST_ID};
pub use server::{envelope_response, AppState, HttpServer};
