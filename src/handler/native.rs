//! Native (in-process Rust) handler modules.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::envelope::{HandlerResult, RequestEnvelope};
use crate::handler::{Method, MethodSet};

/// A native handler entry point.
pub type HandlerFn = Arc<dyn Fn(&RequestEnvelope) -> HandlerResult + Send + Sync>;

/// A handler module implemented in Rust.
///
/// Built once with one closure per exported method:
///
/// ```rust,ignore
/// let users = NativeModule::new("users")
///     .get(|_req| HandlerResult::ok(json!({"users": []})))
///     .post(|req| create_user(req));
/// ```
#[derive(Clone, Default)]
pub struct NativeModule {
    name: String,
    entries: HashMap<Method, HandlerFn>,
}

impl NativeModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
        }
    }

    /// Export `f` under `method`. A later export for the same method replaces
    /// the earlier one.
    pub fn export<F>(mut self, method: Method, f: F) -> Self
    where
        F: Fn(&RequestEnvelope) -> HandlerResult + Send + Sync + 'static,
    {
        self.entries.insert(method, Arc::new(f));
        self
    }

    pub fn get<F>(self, f: F) -> Self
    where
        F: Fn(&RequestEnvelope) -> HandlerResult + Send + Sync + 'static,
    {
        self.export(Method::Get, f)
    }

    pub fn post<F>(self, f: F) -> Self
    where
        F: Fn(&RequestEnvelope) -> HandlerResult + Send + Sync + 'static,
    {
        self.export(Method::Post, f)
    }

    pub fn put<F>(self, f: F) -> Self
    where
        F: Fn(&RequestEnvelope) -> HandlerResult + Send + Sync + 'static,
    {
        self.export(Method::Put, f)
    }

    pub fn delete<F>(self, f: F) -> Self
    where
        F: Fn(&RequestEnvelope) -> HandlerResult + Send + Sync + 'static,
    {
        self.export(Method::Delete, f)
    }

    pub fn patch<F>(self, f: F) -> Self
    where
        F: Fn(&RequestEnvelope) -> HandlerResult + Send + Sync + 'static,
    {
        self.export(Method::Patch, f)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> MethodSet {
        self.entries.keys().copied().collect()
    }

    pub fn handler(&self, method: Method) -> Option<&HandlerFn> {
        self.entries.get(&method)
    }
}

impl fmt::Debug for NativeModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeModule")
            .field("name", &self.name)
            .field("methods", &self.methods())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{Params, RawRequest};

    #[test]
    fn test_exports() {
        let module = NativeModule::new("hello")
            .get(|_| HandlerResult::ok("hi"))
            .delete(|_| HandlerResult::ok("bye"));

        assert_eq!(module.name(), "hello");
        assert!(module.methods().contains(Method::Get));
        assert!(module.methods().contains(Method::Delete));
        assert!(!module.methods().contains(Method::Post));

        let req = RequestEnvelope::build(RawRequest::new("GET", "/"), Method::Get, Params::new());
        let f = module.handler(Method::Get).unwrap();
        assert_eq!(f(&req), HandlerResult::ok("hi"));
    }
}
