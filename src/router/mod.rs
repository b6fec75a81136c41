//! Request orchestration.
//!
//! # Data Flow
//! ```text
//! RawRequest
//!     → Resolving    (route table snapshot, path matcher)     → 404
//!     → Dispatching  (method token, module method set)        → 405
//!     → Invoking     (envelope, bridge under timeout + retry) → 500 / 504
//!     → Normalizing  (handler result → {status, body})        → 500
//!     → Done         (ResponseEnvelope)
//! ```
//!
//! # Design Decisions
//! - Every failure is converted to a `ResponseEnvelope` here; nothing
//!   escapes to the transport
//! - The router holds no per-request state and is shared behind an `Arc`
//! - Each request works on one route table snapshot, even if a reload
//!   publishes a new table mid-request
//! - The invocation deadline covers all retry attempts

pub mod error;

pub use error::RouterError;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::bridge::InvocationBridge;
use crate::config::RouterConfig;
use crate::envelope::{normalize, HandlerResult, Params, RawRequest, RequestEnvelope, ResponseEnvelope};
use crate::handler::{dispatch, EntryPoint, Method, MethodNotAllowed, ModuleRef};
use crate::observability::metrics;
use crate::resilience::{with_timeout, RetryPolicy};
use crate::routing::SharedRoutes;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Label used for requests that matched no route.
const UNMATCHED: &str = "none";

/// Where a request is in its lifecycle.
enum Stage {
    Resolving(RawRequest),
    Dispatching {
        raw: RawRequest,
        module: ModuleRef,
        params: Params,
    },
    Invoking {
        entry: EntryPoint,
        envelope: RequestEnvelope,
    },
    Normalizing(HandlerResult),
    Done(ResponseEnvelope),
}

/// Resolves, dispatches and invokes handlers for incoming requests.
pub struct Router {
    routes: SharedRoutes,
    bridge: Arc<dyn InvocationBridge>,
    timeout: Duration,
    retry: RetryPolicy,
    expose_details: bool,
}

impl Router {
    pub fn new(routes: SharedRoutes, bridge: Arc<dyn InvocationBridge>) -> Self {
        Self {
            routes,
            bridge,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            expose_details: false,
        }
    }

    pub fn from_config(
        routes: SharedRoutes,
        bridge: Arc<dyn InvocationBridge>,
        config: &RouterConfig,
    ) -> Self {
        Self::new(routes, bridge)
            .with_timeout(Duration::from_millis(config.invocation.timeout_ms))
            .with_retry(RetryPolicy::from_config(&config.retries))
            .expose_details(config.errors.expose_details)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Include internal failure detail in 5xx error bodies.
    pub fn expose_details(mut self, expose: bool) -> Self {
        self.expose_details = expose;
        self
    }

    /// The route table handle, for reloads.
    pub fn routes(&self) -> &SharedRoutes {
        &self.routes
    }

    /// Handle one request. Never fails: errors become error envelopes.
    pub async fn handle(&self, raw: RawRequest) -> ResponseEnvelope {
        let start = Instant::now();
        let method = raw.method.clone();
        let path = raw.path().to_string();
        let mut route = String::from(UNMATCHED);

        let response = match self.run(raw, &mut route).await {
            Ok(response) => response,
            Err(e) => {
                self.log_failure(&e, &method, &path, &route);
                ResponseEnvelope::error(e.status(), e.public_message(self.expose_details))
            }
        };

        metrics::record_request(&method, response.status, &route, start);
        tracing::debug!(
            method = %method,
            path = %path,
            route = %route,
            status = response.status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Request handled"
        );
        response
    }

    async fn run(&self, raw: RawRequest, route: &mut String) -> Result<ResponseEnvelope, RouterError> {
        let table = self.routes.load_full();
        let mut stage = Stage::Resolving(raw);

        loop {
            stage = match stage {
                Stage::Resolving(raw) => {
                    let found = table.resolve(raw.path()).ok_or_else(|| RouterError::RouteNotFound {
                        path: raw.path().to_string(),
                    })?;
                    *route = found.route.pattern().to_string();
                    Stage::Dispatching {
                        module: found.route.module().clone(),
                        params: found.params,
                        raw,
                    }
                }
                Stage::Dispatching { raw, module, params } => {
                    // An unknown token can never be exported, so it is a 405.
                    let method: Method = raw.method.parse().map_err(|_| MethodNotAllowed {
                        method: raw.method.clone(),
                        allowed: module.methods(),
                    })?;
                    let entry = dispatch(&module, method)?;
                    Stage::Invoking {
                        envelope: RequestEnvelope::build(raw, method, params),
                        entry,
                    }
                }
                Stage::Invoking { entry, envelope } => {
                    Stage::Normalizing(self.invoke(&entry, envelope).await?)
                }
                Stage::Normalizing(result) => Stage::Done(normalize(result)?),
                Stage::Done(response) => return Ok(response),
            };
        }
    }

    async fn invoke(
        &self,
        entry: &EntryPoint,
        envelope: RequestEnvelope,
    ) -> Result<HandlerResult, RouterError> {
        let bridge = self.bridge.as_ref();
        let outcome = with_timeout(
            self.timeout,
            self.retry.run(move |_| bridge.invoke(entry, envelope.clone())),
        )
        .await;

        let language = entry.module().language();
        match &outcome {
            Ok(_) => metrics::record_invocation(language.as_str(), "ok"),
            Err(e) => metrics::record_invocation(language.as_str(), e.kind()),
        }
        outcome.map_err(RouterError::from)
    }

    fn log_failure(&self, error: &RouterError, method: &str, path: &str, route: &str) {
        match error {
            RouterError::RouteNotFound { .. } | RouterError::MethodNotAllowed(_) => {
                tracing::debug!(method = %method, path = %path, error = %error, "Request rejected");
            }
            RouterError::InvocationTimeout(_) => {
                tracing::warn!(method = %method, route = %route, error = %error, "Handler timed out");
            }
            RouterError::InvocationCrashed(_) | RouterError::MalformedHandlerOutput(_) => {
                tracing::error!(method = %method, route = %route, error = %error, "Handler failed");
            }
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.load().len())
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("expose_details", &self.expose_details)
            .finish()
    }
}
