//! In-memory watchlists.
//!
//! The only built-in handler with state. The state belongs to the module and
//! is guarded by its own mutex; the router knows nothing about it.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use serde_json::{json, Value};

use crate::envelope::{HandlerResult, RequestEnvelope};
use crate::handler::{HandlerModule, ModuleRef, NativeModule};
use crate::handlers::{json_body, str_field};

#[derive(Debug, Clone, Serialize)]
struct Watchlist {
    id: String,
    name: String,
    symbols: Vec<String>,
}

#[derive(Debug, Default)]
struct Store {
    next_id: u64,
    lists: BTreeMap<String, Watchlist>,
}

type Shared = Arc<Mutex<Store>>;

fn lock(store: &Shared) -> MutexGuard<'_, Store> {
    // A panicking handler cannot leave a half-written entry behind.
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn module() -> ModuleRef {
    let store = Shared::default();
    let (a, b, c) = (store.clone(), store.clone(), store);
    HandlerModule::native(
        NativeModule::new("watchlist")
            .get(move |req| list(&a, req))
            .post(move |req| create(&b, req))
            .delete(move |req| remove(&c, req)),
    )
}

fn list(store: &Shared, _req: &RequestEnvelope) -> HandlerResult {
    let store = lock(store);
    let data: Vec<&Watchlist> = store.lists.values().collect();
    HandlerResult::ok(json!({ "count": data.len(), "data": data }))
}

fn create(store: &Shared, req: &RequestEnvelope) -> HandlerResult {
    let data = match json_body(req) {
        Ok(data) => data,
        Err(response) => return response,
    };
    let Some(name) = str_field(&data, "name") else {
        return HandlerResult::error(400, "name is required");
    };
    let symbols = data
        .get("symbols")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_uppercase)
                .collect()
        })
        .unwrap_or_default();

    let mut store = lock(store);
    store.next_id += 1;
    let watchlist = Watchlist {
        id: format!("WL-{}", store.next_id),
        name: name.to_string(),
        symbols,
    };
    store.lists.insert(watchlist.id.clone(), watchlist.clone());

    HandlerResult::status(
        201,
        json!({ "message": "Watchlist created successfully", "data": watchlist }),
    )
}

fn remove(store: &Shared, req: &RequestEnvelope) -> HandlerResult {
    let id = req
        .query()
        .get("id")
        .map(|v| v.first().to_string())
        .or_else(|| json_body(req).ok().and_then(|d| str_field(&d, "id").map(str::to_string)));
    let Some(id) = id else {
        return HandlerResult::error(400, "id is required");
    };

    match lock(store).lists.remove(&id) {
        Some(removed) => HandlerResult::ok(json!({ "message": "Watchlist deleted", "data": removed })),
        None => HandlerResult::error(404, format!("Watchlist {id} not found")),
    }
}
