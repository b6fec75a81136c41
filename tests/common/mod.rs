//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use polyglot_router::bridge::{InvocationBridge, InvocationError, NativeBridge};
use polyglot_router::config::ListenerConfig;
use polyglot_router::envelope::{HandlerResult, RequestEnvelope};
use polyglot_router::handler::{EntryPoint, HandlerModule, ModuleRef, NativeModule};
use polyglot_router::http::HttpServer;
use polyglot_router::lifecycle::Shutdown;
use polyglot_router::routing::share;
use polyglot_router::{RouteTable, Router};
use tokio::net::TcpListener;

/// A native module exporting GET that returns `body` with status 200.
pub fn static_module(name: &str, body: serde_json::Value) -> ModuleRef {
    HandlerModule::native(NativeModule::new(name).get(move |_| HandlerResult::ok(body.clone())))
}

/// Build a table from `(pattern, module)` pairs, panicking on bad input.
pub fn table(routes: Vec<(&str, ModuleRef)>) -> RouteTable {
    let mut table = RouteTable::new();
    for (pattern, module) in routes {
        table.register(pattern, module).unwrap();
    }
    table
}

/// A router over `table` using the in-process bridge.
pub fn native_router(table: RouteTable) -> Router {
    Router::new(share(table), Arc::new(NativeBridge::new()))
}

/// Serve `router` on an ephemeral local port until `shutdown` fires.
pub async fn spawn_server(router: Router, shutdown: &Shutdown) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = ListenerConfig {
        bind_address: addr.to_string(),
        max_body_bytes: 1024,
    };

    let server = HttpServer::new(Arc::new(router), &config);
    let wait = shutdown.wait();
    tokio::spawn(async move {
        server.run(listener, wait).await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    addr
}

/// A bridge that never answers; drives timeout tests.
pub struct HangingBridge;

#[async_trait]
impl InvocationBridge for HangingBridge {
    async fn invoke(
        &self,
        _entry: &EntryPoint,
        _request: RequestEnvelope,
    ) -> Result<HandlerResult, InvocationError> {
        std::future::pending().await
    }
}
