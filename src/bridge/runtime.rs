//! Bridge that routes each entry point to the bridge for its module kind.

use async_trait::async_trait;

use crate::bridge::{InvocationBridge, InvocationError, NativeBridge, ProcessBridge};
use crate::config::RuntimesConfig;
use crate::envelope::{HandlerResult, RequestEnvelope};
use crate::handler::{EntryPoint, ModuleKind};

/// Native modules run in-process, script modules in interpreter children.
#[derive(Debug, Clone, Default)]
pub struct RuntimeBridge {
    native: NativeBridge,
    process: ProcessBridge,
}

impl RuntimeBridge {
    pub fn new(runtimes: RuntimesConfig) -> Self {
        Self {
            native: NativeBridge,
            process: ProcessBridge::new(runtimes),
        }
    }
}

#[async_trait]
impl InvocationBridge for RuntimeBridge {
    async fn invoke(
        &self,
        entry: &EntryPoint,
        request: RequestEnvelope,
    ) -> Result<HandlerResult, InvocationError> {
        match entry.module().kind() {
            ModuleKind::Native(_) => self.native.invoke(entry, request).await,
            ModuleKind::Script(_) => self.process.invoke(entry, request).await,
        }
    }
}
