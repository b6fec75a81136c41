//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a catch-all handler
//! - Wire up middleware (tracing, limits, request ID)
//! - Bind server to listener
//! - Hand every request to the polyglot router and write its envelope back
//!
//! # Design Decisions
//! - Axum does no routing of its own; the route table decides everything
//! - The HTTP status is the envelope status, the payload is the envelope body
//! - Graceful shutdown waits for in-flight requests

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ListenerConfig;
use crate::envelope::ResponseEnvelope;
use crate::http::request::{into_raw_request, UuidRequestId};
use crate::router::Router;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router>,
    pub max_body_bytes: usize,
}

/// HTTP front end for the router.
pub struct HttpServer {
    app: axum::Router,
}

impl HttpServer {
    pub fn new(router: Arc<Router>, config: &ListenerConfig) -> Self {
        let state = AppState {
            router,
            max_body_bytes: config.max_body_bytes,
        };
        Self {
            app: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> axum::Router {
        let max_body_bytes = state.max_body_bytes;
        axum::Router::new()
            .route("/", any(route_request))
            .route("/{*path}", any(route_request))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(max_body_bytes)),
            )
    }

    /// The fully layered Axum app.
    pub fn app(&self) -> axum::Router {
        self.app.clone()
    }

    /// Serve on `listener` until `shutdown` resolves, then drain.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: every request goes through the route table.
async fn route_request(State(state): State<AppState>, request: Request) -> Response {
    let raw = match into_raw_request(request, state.max_body_bytes).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected request body");
            return envelope_response(&ResponseEnvelope::error(e.status(), e.to_string()));
        }
    };

    let envelope = state.router.handle(raw).await;
    envelope_response(&envelope)
}

/// Write `envelope` as an HTTP response: its status, its body as JSON.
pub fn envelope_response(envelope: &ResponseEnvelope) -> Response {
    let status = StatusCode::from_u16(envelope.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, Body::from(envelope.body_json())).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
