//! The route table.
//!
//! # Responsibilities
//! - Store routes (pattern + module handle)
//! - Reject ambiguous registrations
//! - Build routes from a handler directory
//! - Resolve request paths through the matcher
//!
//! # Design Decisions
//! - Read-only once built; shared behind `Arc` without locks
//! - First registration wins; a later pattern with the same shape is a
//!   `DuplicateRoute` error, never silently shadowed
//! - Deterministic: the same files always yield the same table

use std::collections::HashMap;
use std::path::Path;

use crate::envelope::Params;
use crate::handler::{HandlerModule, ModuleRef, ScriptModule};
use crate::routing::discovery::discover;
use crate::routing::matcher::PathMatcher;
use crate::routing::pattern::Pattern;
use crate::routing::RouteError;

/// A URL pattern bound to one handler module.
#[derive(Debug, Clone)]
pub struct Route {
    pattern: Pattern,
    module: ModuleRef,
}

impl Route {
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn module(&self) -> &ModuleRef {
        &self.module
    }
}

/// A resolved request path.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: Params,
}

/// Immutable mapping from URL pattern to handler module.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    shapes: HashMap<String, usize>,
    matcher: PathMatcher,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from every handler file under `dir`.
    pub fn build(dir: &Path, prefix: &str) -> Result<Self, RouteError> {
        let mut table = Self::new();
        table.discover(dir, prefix)?;
        Ok(table)
    }

    /// Register a route from its textual pattern.
    pub fn register(&mut self, pattern: &str, module: ModuleRef) -> Result<(), RouteError> {
        let pattern = Pattern::parse(pattern)?;
        self.register_pattern(pattern, module)
    }

    /// Register a parsed pattern.
    pub fn register_pattern(&mut self, pattern: Pattern, module: ModuleRef) -> Result<(), RouteError> {
        let shape = pattern.shape();
        if let Some(&existing) = self.shapes.get(&shape) {
            return Err(RouteError::Duplicate {
                pattern: pattern.to_string(),
                existing: self.routes[existing].pattern.to_string(),
            });
        }

        let index = self.routes.len();
        if let Err(existing) = self.matcher.insert(&pattern, index) {
            return Err(RouteError::Duplicate {
                pattern: pattern.to_string(),
                existing: self.routes[existing].pattern.to_string(),
            });
        }

        tracing::debug!(
            pattern = %pattern,
            module = %module.name(),
            language = %module.language(),
            methods = %module.methods(),
            "Route registered"
        );
        self.shapes.insert(shape, index);
        self.routes.push(Route { pattern, module });
        Ok(())
    }

    /// Load every handler file under `dir` and register it. Returns the number
    /// of routes added.
    pub fn discover(&mut self, dir: &Path, prefix: &str) -> Result<usize, RouteError> {
        let files = discover(dir, prefix)?;
        let count = files.len();
        for file in files {
            let module = ScriptModule::load(&file.path)?;
            self.register_pattern(file.pattern, HandlerModule::script(module))?;
        }
        tracing::info!(directory = %dir.display(), routes = count, "Handler directory scanned");
        Ok(count)
    }

    /// Find the route serving `path` and its captured parameters.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let (index, params) = self.matcher.find(path)?;
        Some(RouteMatch {
            route: &self.routes[index],
            params,
        })
    }

    /// Routes in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
