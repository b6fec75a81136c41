//! Handler module handles.

use std::sync::Arc;

use crate::handler::native::NativeModule;
use crate::handler::script::ScriptModule;
use crate::handler::{Language, MethodSet};

/// Shared handle to a loaded handler module.
pub type ModuleRef = Arc<HandlerModule>;

/// How a module is executed.
#[derive(Debug)]
pub enum ModuleKind {
    Native(NativeModule),
    Script(ScriptModule),
}

/// A named set of method entry points serving one route.
///
/// The method set is resolved when the module is loaded and never changes.
#[derive(Debug)]
pub struct HandlerModule {
    name: String,
    language: Language,
    methods: MethodSet,
    kind: ModuleKind,
}

impl HandlerModule {
    pub fn native(module: NativeModule) -> ModuleRef {
        Arc::new(Self {
            name: module.name().to_string(),
            language: Language::Rust,
            methods: module.methods(),
            kind: ModuleKind::Native(module),
        })
    }

    pub fn script(module: ScriptModule) -> ModuleRef {
        Arc::new(Self {
            name: module.path().display().to_string(),
            language: module.language(),
            methods: module.methods(),
            kind: ModuleKind::Script(module),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn methods(&self) -> MethodSet {
        self.methods
    }

    pub fn kind(&self) -> &ModuleKind {
        &self.kind
    }
}
