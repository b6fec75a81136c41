//! Method dispatch.
//!
//! A pure lookup of the entry point named after the request method. The only
//! failure is a method the module does not export, which the router turns
//! into a 405.

use crate::handler::{Method, MethodSet, ModuleRef};

/// A resolved entry point: one method of one module.
#[derive(Debug, Clone)]
pub struct EntryPoint {
    module: ModuleRef,
    method: Method,
}

impl EntryPoint {
    pub fn module(&self) -> &ModuleRef {
        &self.module
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The exported function name.
    pub fn function_name(&self) -> &'static str {
        self.method.as_str()
    }
}

/// The module does not export the requested method.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("method {method} not allowed (allowed: {allowed})")]
pub struct MethodNotAllowed {
    pub method: String,
    pub allowed: MethodSet,
}

/// Select the entry point for `method` in `module`.
pub fn dispatch(module: &ModuleRef, method: Method) -> Result<EntryPoint, MethodNotAllowed> {
    if module.methods().contains(method) {
        Ok(EntryPoint {
            module: module.clone(),
            method,
        })
    } else {
        Err(MethodNotAllowed {
            method: method.to_string(),
            allowed: module.methods(),
        })
    }
}
