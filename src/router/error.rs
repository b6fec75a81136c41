//! Request-time error taxonomy.

use std::time::Duration;

use crate::bridge::InvocationError;
use crate::envelope::NormalizeError;
use crate::handler::MethodNotAllowed;

/// Everything that can end a request before a handler response is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    #[error("no route matches {path}")]
    RouteNotFound { path: String },

    #[error(transparent)]
    MethodNotAllowed(#[from] MethodNotAllowed),

    #[error("handler did not finish within {}ms", .0.as_millis())]
    InvocationTimeout(Duration),

    #[error("handler failed: {0}")]
    InvocationCrashed(String),

    #[error("malformed handler output: {0}")]
    MalformedHandlerOutput(String),
}

impl RouterError {
    /// HTTP status for this error.
    pub fn status(&self) -> u16 {
        match self {
            RouterError::RouteNotFound { .. } => 404,
            RouterError::MethodNotAllowed(_) => 405,
            RouterError::InvocationTimeout(_) => 504,
            RouterError::InvocationCrashed(_) | RouterError::MalformedHandlerOutput(_) => 500,
        }
    }

    /// Message sent to the caller. Server-side failures stay generic unless
    /// `expose_details` is set.
    pub fn public_message(&self, expose_details: bool) -> String {
        match self {
            RouterError::RouteNotFound { .. } | RouterError::MethodNotAllowed(_) => self.to_string(),
            _ if expose_details => self.to_string(),
            RouterError::InvocationTimeout(_) => "Gateway Timeout".to_string(),
            RouterError::InvocationCrashed(_) | RouterError::MalformedHandlerOutput(_) => {
                "Internal Server Error".to_string()
            }
        }
    }
}

impl From<InvocationError> for RouterError {
    fn from(error: InvocationError) -> Self {
        match error {
            InvocationError::Timeout(limit) => RouterError::InvocationTimeout(limit),
            InvocationError::MalformedResult(detail) => RouterError::MalformedHandlerOutput(detail),
            InvocationError::Crashed(detail) | InvocationError::Transient(detail) => {
                RouterError::InvocationCrashed(detail)
            }
        }
    }
}

impl From<NormalizeError> for RouterError {
    fn from(error: NormalizeError) -> Self {
        RouterError::MalformedHandlerOutput(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{Method, MethodSet};

    #[test]
    fn test_status_mapping() {
        let not_allowed = MethodNotAllowed {
            method: "PATCH".into(),
            allowed: [Method::Get].into_iter().collect::<MethodSet>(),
        };
        assert_eq!(RouterError::RouteNotFound { path: "/x".into() }.status(), 404);
        assert_eq!(RouterError::from(not_allowed).status(), 405);
        assert_eq!(RouterError::from(InvocationError::Timeout(Duration::from_secs(1))).status(), 504);
        assert_eq!(RouterError::from(InvocationError::Crashed("x".into())).status(), 500);
        assert_eq!(RouterError::from(NormalizeError::MissingBody).status(), 500);
    }

    #[test]
    fn test_public_message_hides_internals() {
        let err = RouterError::from(InvocationError::Crashed("TypeError at line 3".into()));
        assert_eq!(err.public_message(false), "Internal Server Error");
        assert_eq!(err.public_message(true), "handler failed: TypeError at line 3");

        let err = RouterError::from(NormalizeError::InvalidJson("expected value".into()));
        assert!(!err.public_message(false).contains("expected value"));

        let err = RouterError::InvocationTimeout(Duration::from_millis(250));
        assert_eq!(err.public_message(false), "Gateway Timeout");
        assert_eq!(err.public_message(true), "handler did not finish within 250ms");
    }

    #[test]
    fn test_client_errors_are_descriptive() {
        let err = RouterError::RouteNotFound { path: "/api/nope".into() };
        assert_eq!(err.public_message(false), "no route matches /api/nope");
    }
}
