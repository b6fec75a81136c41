//! Handler modules and method dispatch.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     NativeModule (Rust closures)  ─┐
//!     ScriptModule (file + scan)    ─┴→ HandlerModule { methods resolved } → ModuleRef
//!
//! Per request:
//!     ModuleRef + Method → dispatcher.rs → EntryPoint | MethodNotAllowed
//! ```

pub mod dispatcher;
pub mod method;
pub mod module;
pub mod native;
pub mod script;

pub use dispatcher::{dispatch, EntryPoint, MethodNotAllowed};
pub use method::{Language, Method, MethodSet, UnknownMethod};
pub use module::{HandlerModule, ModuleKind, ModuleRef};
pub use native::{HandlerFn, NativeModule};
pub use script::{LoadError, ScriptModule};
