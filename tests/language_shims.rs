//! Script handlers run through the real interpreters.
//!
//! Each test returns early when its interpreter is not installed.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use polyglot_router::bridge::ProcessBridge;
use polyglot_router::config::RuntimesConfig;
use polyglot_router::envelope::RawRequest;
use polyglot_router::resilience::RetryPolicy;
use polyglot_router::routing::share;
use polyglot_router::{RouteTable, Router};
use serde_json::json;
use tempfile::TempDir;

fn installed(program: &str) -> bool {
    let found = std::process::Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    if !found {
        eprintln!("skipping: `{program}` is not installed");
    }
    found
}

/// Write `files` into a fresh routes directory below the working directory
/// and return it with its path relative to the working directory.
fn routes_dir(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let dir = tempfile::Builder::new().prefix("routes").tempdir_in(".").unwrap();
    for (name, source) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, source).unwrap();
    }
    let cwd = std::env::current_dir().unwrap();
    let relative = dir.path().strip_prefix(&cwd).unwrap_or(dir.path()).to_path_buf();
    (dir, relative)
}

fn script_router(dir: &Path) -> Router {
    let table = RouteTable::build(dir, "/api").unwrap();
    Router::new(share(table), Arc::new(ProcessBridge::new(RuntimesConfig::default())))
        .with_retry(RetryPolicy::none())
}

#[tokio::test]
async fn test_javascript_handlers() {
    if !installed("node") {
        return;
    }
    let (_guard, dir) = routes_dir(&[
        (
            "structured.js",
            "function GET(req) {\n  return { status: 201, body: { name: req.query.name } };\n}\n",
        ),
        (
            "text.js",
            "function GET(req) {\n  return JSON.stringify({ status: 202, body: \"plain\" });\n}\n",
        ),
        ("boom.js", "function GET(req) {\n  throw new Error(\"boom\");\n}\n"),
        (
            "noisy.js",
            "function GET(req) {\n  console.log(\"chatter\");\n  return { body: { quiet: true } };\n}\n",
        ),
        (
            "exported.js",
            "exports.GET = function (req) {\n  return { body: \"exported\" };\n};\n",
        ),
        (
            "items/[id].mjs",
            "export async function GET(req) {\n  return { body: { id: req.params.id } };\n}\n",
        ),
    ]);
    let router = script_router(&dir);

    let response = router.handle(RawRequest::new("GET", "/api/structured?name=Ada")).await;
    assert_eq!(response.status, 201);
    assert_eq!(response.body, json!({"name": "Ada"}));

    let response = router.handle(RawRequest::new("GET", "/api/text")).await;
    assert_eq!(response.status, 202);
    assert_eq!(response.body, json!("plain"));

    let response = router.handle(RawRequest::new("GET", "/api/boom")).await;
    assert_eq!(response.status, 500);
    assert!(!response.body.to_string().contains("boom"));

    let response = router.handle(RawRequest::new("GET", "/api/noisy")).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({"quiet": true}));

    let response = router.handle(RawRequest::new("GET", "/api/exported")).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!("exported"));

    let response = router.handle(RawRequest::new("GET", "/api/items/7")).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({"id": "7"}));
}

#[tokio::test]
async fn test_python_handlers() {
    if !installed("python3") {
        return;
    }
    let (_guard, dir) = routes_dir(&[
        (
            "structured.py",
            "def GET(req):\n    return {\"status\": 201, \"body\": {\"name\": req[\"query\"][\"name\"]}}\n",
        ),
        (
            "text.py",
            "import json\n\ndef GET(req):\n    return json.dumps({\"status\": 202, \"body\": \"plain\"})\n",
        ),
        ("boom.py", "def GET(req):\n    raise RuntimeError(\"boom\")\n"),
        (
            "noisy.py",
            "def GET(req):\n    print(\"chatter\")\n    return {\"body\": {\"quiet\": True}}\n",
        ),
        (
            "users/[id].py",
            "async def GET(req):\n    return {\"body\": {\"id\": req[\"params\"][\"id\"]}}\n",
        ),
    ]);
    let router = script_router(&dir);

    let response = router.handle(RawRequest::new("GET", "/api/structured?name=Ada")).await;
    assert_eq!(response.status, 201);
    assert_eq!(response.body, json!({"name": "Ada"}));

    let response = router.handle(RawRequest::new("GET", "/api/text")).await;
    assert_eq!(response.status, 202);
    assert_eq!(response.body, json!("plain"));

    let response = router.handle(RawRequest::new("GET", "/api/boom")).await;
    assert_eq!(response.status, 500);

    let response = router.handle(RawRequest::new("GET", "/api/noisy")).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({"quiet": true}));

    let response = router.handle(RawRequest::new("GET", "/api/users/42")).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({"id": "42"}));
}

#[tokio::test]
async fn test_ruby_handlers() {
    if !installed("ruby") {
        return;
    }
    let (_guard, dir) = routes_dir(&[
        (
            "structured.rb",
            "def GET(req)\n  { status: 201, body: { name: req['query']['name'] } }\nend\n",
        ),
        (
            "text.rb",
            "def GET(req)\n  JSON.generate({ status: 202, body: 'plain' })\nend\n",
        ),
        ("boom.rb", "def GET(req)\n  raise 'boom'\nend\n"),
        (
            "noisy.rb",
            "def GET(req)\n  puts 'chatter'\n  { body: { quiet: true } }\nend\n",
        ),
    ]);
    let router = script_router(&dir);

    let response = router.handle(RawRequest::new("GET", "/api/structured?name=Ada")).await;
    assert_eq!(response.status, 201);
    assert_eq!(response.body, json!({"name": "Ada"}));

    let response = router.handle(RawRequest::new("GET", "/api/text")).await;
    assert_eq!(response.status, 202);
    assert_eq!(response.body, json!("plain"));

    let response = router.handle(RawRequest::new("GET", "/api/boom")).await;
    assert_eq!(response.status, 500);

    let response = router.handle(RawRequest::new("GET", "/api/noisy")).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({"quiet": true}));
}

#[tokio::test]
async fn test_bundled_api_directory_serves_scripts() {
    if !installed("node") {
        return;
    }
    // Same relative directory `serve` uses by default.
    let router = script_router(Path::new("api"));

    let response = router.handle(RawRequest::new("GET", "/api/greet?name=Ada")).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({"message": "Hello, Ada! From JavaScript"}));

    let response = router.handle(RawRequest::new("POST", "/api/greet")).await;
    assert_eq!(response.status, 400);
    assert_eq!(response.body, json!({"error": "request body is required"}));

    let response = router
        .handle(RawRequest::new("POST", "/api/greet").body(r#"{"name": "Ada"}"#))
        .await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({"message": "Hello, Ada!"}));

    let response = router.handle(RawRequest::new("GET", "/api/orders/17")).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body["order"]["symbol"], json!("AAPL"));

    if installed("python3") {
        let response = router.handle(RawRequest::new("GET", "/api/pygreet")).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, json!({"message": "Hello from Python!"}));
    }
}
