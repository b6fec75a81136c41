//! HTTP transport tests against a live server.

use std::time::Duration;

use polyglot_router::envelope::HandlerResult;
use polyglot_router::handler::{HandlerModule, NativeModule};
use polyglot_router::lifecycle::Shutdown;
use polyglot_router::{handlers, RouteTable};
use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

fn app_table() -> RouteTable {
    let mut table = RouteTable::new();
    handlers::mount(&mut table, "/api").unwrap();
    table
        .register(
            "/api/echo/[name]",
            HandlerModule::native(NativeModule::new("echo").export(
                polyglot_router::handler::Method::Post,
                |req| {
                    HandlerResult::ok(json!({
                        "name": req.param("name"),
                        "body": req.body(),
                        "trace": req.header("X-Trace"),
                        "tags": req.query().get("tag"),
                    }))
                },
            )),
        )
        .unwrap();
    table
}

#[tokio::test]
async fn test_status_and_body_come_from_envelope() {
    let shutdown = Shutdown::new();
    let addr = common::spawn_server(common::native_router(app_table()), &shutdown).await;
    let client = reqwest::Client::new();

    let res = client.get(format!("http://{addr}/api/users/42")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["id"], 42);

    let res = client.get(format!("http://{addr}/api/users/7")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    shutdown.trigger();
}

#[tokio::test]
async fn test_router_errors_map_to_http_status() {
    let shutdown = Shutdown::new();
    let addr = common::spawn_server(common::native_router(app_table()), &shutdown).await;
    let client = reqwest::Client::new();

    let res = client.get(format!("http://{addr}/nothing/here")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].is_string());

    let res = client.patch(format!("http://{addr}/api/hello")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    let res = client.post(format!("http://{addr}/api/hello")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_is_carried_into_envelope() {
    let shutdown = Shutdown::new();
    let addr = common::spawn_server(common::native_router(app_table()), &shutdown).await;

    let res = reqwest::Client::new()
        .post(format!("http://{addr}/api/echo/ada?tag=a&tag=b"))
        .header("x-trace", "abc")
        .body("raw text, not parsed")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "name": "ada",
            "body": "raw text, not parsed",
            "trace": "abc",
            "tags": ["a", "b"],
        })
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_body_limits() {
    let shutdown = Shutdown::new();
    let addr = common::spawn_server(common::native_router(app_table()), &shutdown).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{addr}/api/echo/big"))
        .body("x".repeat(4096))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let res = client
        .post(format!("http://{addr}/api/echo/bytes"))
        .body(vec![0xffu8, 0xfe, 0xfd])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    shutdown.trigger();
}

#[tokio::test]
async fn test_graceful_shutdown_stops_listener() {
    let shutdown = Shutdown::new();
    let addr = common::spawn_server(common::native_router(app_table()), &shutdown).await;
    let client = reqwest::Client::new();

    let res = client.get(format!("http://{addr}/api/time")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let result = reqwest::Client::new()
        .get(format!("http://{addr}/api/time"))
        .timeout(Duration::from_secs(1))
        .send()
        .await;
    assert!(result.is_err());
}
