//! Handler directory watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::observability::metrics;
use crate::routing::{RouteError, RouteTable, SharedRoutes};

/// Rebuilds the route table when files under the routes directory change.
///
/// A rebuild that fails (duplicate route, unreadable file) is logged and the
/// table currently in service is kept.
pub struct RouteWatcher<F> {
    dir: PathBuf,
    routes: SharedRoutes,
    rebuild: F,
}

impl<F> RouteWatcher<F>
where
    F: Fn() -> Result<RouteTable, RouteError> + Send + 'static,
{
    pub fn new(dir: &Path, routes: SharedRoutes, rebuild: F) -> Self {
        Self {
            dir: dir.to_path_buf(),
            routes,
            rebuild,
        }
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { dir, routes, rebuild } = self;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() {
                        tracing::info!(paths = ?event.paths, "Handler files changed, rebuilding routes");
                        reload(&routes, &rebuild);
                    }
                }
                Err(e) => tracing::error!(error = %e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::Recursive)?;

        tracing::info!(path = %dir.display(), "Route watcher started");
        Ok(watcher)
    }
}

/// Rebuild and publish a new table, keeping the current one on failure.
/// Returns whether a new table was published.
pub fn reload<F>(routes: &SharedRoutes, rebuild: &F) -> bool
where
    F: Fn() -> Result<RouteTable, RouteError>,
{
    match rebuild() {
        Ok(table) => {
            tracing::info!(routes = table.len(), "Route table reloaded");
            metrics::record_routes_loaded(table.len());
            routes.store(Arc::new(table));
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to rebuild routes. Keeping current table.");
            false
        }
    }
}
