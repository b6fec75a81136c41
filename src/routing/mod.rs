//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     native modules → table.rs register()
//!     routes directory → discovery.rs (walk, derive patterns)
//!         → ScriptModule::load → table.rs register()
//!     → Freeze as immutable RouteTable, shared via ArcSwap
//!
//! Incoming request path
//!     → matcher.rs (normalize, walk segment trie)
//!     → Return: RouteMatch { route, params } or None
//!
//! On file change (optional):
//!     watcher.rs → rebuild whole table → atomic swap
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Literal segments beat dynamic ones at every depth
//! - Duplicate patterns abort construction
//! - No match is an expected outcome, not an error

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::handler::LoadError;

pub mod discovery;
pub mod matcher;
pub mod pattern;
pub mod table;
pub mod watcher;

pub use pattern::{Pattern, PatternError, Segment};
pub use table::{Route, RouteMatch, RouteTable};
pub use watcher::RouteWatcher;

/// The route table in service. Readers take a snapshot with `load()`.
pub type SharedRoutes = Arc<ArcSwap<RouteTable>>;

/// Publish `table` as the route table in service.
pub fn share(table: RouteTable) -> SharedRoutes {
    Arc::new(ArcSwap::from_pointee(table))
}

/// Errors building the route table. All are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("duplicate route `{pattern}` conflicts with `{existing}`")]
    Duplicate { pattern: String, existing: String },

    #[error(transparent)]
    InvalidPattern(#[from] PatternError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk routes directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Load(#[from] LoadError),
}
