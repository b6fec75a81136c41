//! In-process bridge for Rust handler modules.

use async_trait::async_trait;

use crate::bridge::{InvocationBridge, InvocationError};
use crate::envelope::{HandlerResult, RequestEnvelope};
use crate::handler::{EntryPoint, ModuleKind};

/// Calls native handler closures on Tokio's blocking pool, so a slow handler
/// never stalls request processing on the async workers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeBridge;

impl NativeBridge {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InvocationBridge for NativeBridge {
    async fn invoke(
        &self,
        entry: &EntryPoint,
        request: RequestEnvelope,
    ) -> Result<HandlerResult, InvocationError> {
        let ModuleKind::Native(module) = entry.module().kind() else {
            return Err(InvocationError::Crashed(format!(
                "{} is not a native module",
                entry.module().name()
            )));
        };
        let handler = module.handler(entry.method()).cloned().ok_or_else(|| {
            InvocationError::Crashed(format!(
                "{} does not export {}",
                module.name(),
                entry.function_name()
            ))
        })?;

        tokio::task::spawn_blocking(move || handler(&request))
            .await
            .map_err(|e| {
                if e.is_panic() {
                    InvocationError::Crashed("handler panicked".to_string())
                } else {
                    InvocationError::Crashed(format!("handler task failed: {e}"))
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{Params, RawRequest};
    use crate::handler::{dispatch, HandlerModule, Method, NativeModule};

    fn request(method: Method) -> RequestEnvelope {
        RequestEnvelope::build(RawRequest::new(method.as_str(), "/x"), method, Params::new())
    }

    #[tokio::test]
    async fn test_invokes_closure() {
        let module = HandlerModule::native(
            NativeModule::new("echo").get(|req| HandlerResult::ok(req.url().to_string())),
        );
        let entry = dispatch(&module, Method::Get).unwrap();
        let result = NativeBridge::new().invoke(&entry, request(Method::Get)).await.unwrap();
        assert_eq!(result, HandlerResult::ok("/x"));
    }

    #[tokio::test]
    async fn test_panic_becomes_crashed() {
        let module = HandlerModule::native(NativeModule::new("boom").get(|_| panic!("boom")));
        let entry = dispatch(&module, Method::Get).unwrap();
        let err = NativeBridge::new().invoke(&entry, request(Method::Get)).await.unwrap_err();
        assert_eq!(err, InvocationError::Crashed("handler panicked".into()));
    }
}
