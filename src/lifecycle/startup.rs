//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the route table: built-in modules first, then discovery
//! - Assemble the router with the default runtime bridge
//! - Start the optional route watcher
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::sync::Arc;

use notify::RecommendedWatcher;
use tokio::net::TcpListener;

use crate::bridge::RuntimeBridge;
use crate::config::{RouterConfig, RoutesConfig};
use crate::handlers;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::router::Router;
use crate::routing::{share, RouteError, RouteTable, RouteWatcher, SharedRoutes};

/// Fatal errors while bringing the router up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to build route table: {0}")]
    Routes(#[from] RouteError),

    #[error("failed to watch routes directory: {0}")]
    Watch(#[from] notify::Error),

    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build a fresh route table from built-in modules and the routes directory.
pub fn build_routes(config: &RoutesConfig) -> Result<RouteTable, RouteError> {
    let mut table = RouteTable::new();
    handlers::mount(&mut table, &config.prefix)?;
    table.discover(&config.directory, &config.prefix)?;
    Ok(table)
}

/// Assemble the router for `config`.
pub fn build_router(config: &RouterConfig) -> Result<Arc<Router>, RouteError> {
    let table = build_routes(&config.routes)?;
    for route in table.routes() {
        tracing::info!(
            pattern = %route.pattern(),
            language = %route.module().language(),
            methods = %route.module().methods(),
            "Route registered"
        );
    }
    metrics::record_routes_loaded(table.len());

    let bridge = Arc::new(RuntimeBridge::new(config.runtimes.clone()));
    Ok(Arc::new(Router::from_config(share(table), bridge, config)))
}

/// Watch the routes directory if enabled. The watcher must be kept alive.
pub fn start_watcher(
    config: &RoutesConfig,
    routes: SharedRoutes,
) -> Result<Option<RecommendedWatcher>, notify::Error> {
    if !config.watch {
        return Ok(None);
    }
    let rebuild_config = config.clone();
    let watcher = RouteWatcher::new(&config.directory, routes, move || build_routes(&rebuild_config));
    watcher.run().map(Some)
}

/// Run the router until `shutdown` is triggered.
pub async fn run(config: RouterConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    let router = build_router(&config)?;
    let _watcher = start_watcher(&config.routes, router.routes().clone())?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        routes = router.routes().load().len(),
        "Listening for connections"
    );

    HttpServer::new(router, &config.listener)
        .run(listener, shutdown.wait())
        .await?;
    Ok(())
}
