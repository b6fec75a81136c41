//! Greeting endpoint.

use serde_json::json;

use crate::envelope::{HandlerResult, RequestEnvelope};
use crate::handler::{HandlerModule, ModuleRef, NativeModule};
use crate::handlers::{json_body, str_field};

pub fn module() -> ModuleRef {
    HandlerModule::native(
        NativeModule::new("hello")
            .get(get)
            .post(post)
            .put(put)
            .delete(delete),
    )
}

fn get(_req: &RequestEnvelope) -> HandlerResult {
    // Pre-serialized on purpose: exercises the text form of a result.
    HandlerResult::Text(
        json!({ "status": 200, "body": { "message": "Hello from Rust!" } }).to_string(),
    )
}

fn post(req: &RequestEnvelope) -> HandlerResult {
    let data = match json_body(req) {
        Ok(data) => data,
        Err(response) => return response,
    };
    match str_field(&data, "name") {
        Some(name) => HandlerResult::ok(json!({ "message": format!("Hello, {name}!") })),
        None => HandlerResult::error(400, "'name' field is required."),
    }
}

fn put(req: &RequestEnvelope) -> HandlerResult {
    let data = match json_body(req) {
        Ok(data) => data,
        Err(response) => return response,
    };
    match (str_field(&data, "name"), str_field(&data, "newName")) {
        (Some(name), Some(new_name)) => HandlerResult::ok(json!({
            "message": format!("Updated name from {name} to {new_name}")
        })),
        _ => HandlerResult::error(400, "Both 'name' and 'newName' fields are required."),
    }
}

fn delete(req: &RequestEnvelope) -> HandlerResult {
    let data = match json_body(req) {
        Ok(data) => data,
        Err(response) => return response,
    };
    match str_field(&data, "name") {
        Some(name) => HandlerResult::ok(json!({ "message": format!("Deleted user {name}") })),
        None => HandlerResult::error(400, "'name' field is required."),
    }
}
