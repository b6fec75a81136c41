//! Mock user directory: `/users` and `/users/[id]`.

use serde_json::{json, Value};

use crate::envelope::{HandlerResult, RequestEnvelope};
use crate::handler::{HandlerModule, ModuleRef, NativeModule};
use crate::handlers::{json_body, str_field};

const USERS: &[(u64, &str, &str)] = &[
    (1, "Ahmed", "ahmed@example.com"),
    (2, "Galal", "galal@example.com"),
    (3, "Eyad", "eyad@example.com"),
    (42, "Test User", "test@example.com"),
];

fn user_json(&(id, name, email): &(u64, &str, &str)) -> Value {
    json!({ "id": id, "name": name, "email": email })
}

/// `GET` lists users, `POST` validates and echoes a new one.
pub fn list_module() -> ModuleRef {
    HandlerModule::native(NativeModule::new("users").get(list).post(create))
}

/// `GET`, `PUT` and `DELETE` on a single user.
pub fn item_module() -> ModuleRef {
    HandlerModule::native(
        NativeModule::new("users/[id]")
            .get(show)
            .put(update)
            .delete(remove),
    )
}

fn list(_req: &RequestEnvelope) -> HandlerResult {
    let users: Vec<Value> = USERS.iter().map(user_json).collect();
    HandlerResult::ok(json!({
        "data": { "users_count": users.len(), "users": users }
    }))
}

fn create(req: &RequestEnvelope) -> HandlerResult {
    let data = match json_body(req) {
        Ok(data) => data,
        Err(response) => return response,
    };
    let (Some(name), Some(email)) = (str_field(&data, "name"), str_field(&data, "email")) else {
        return HandlerResult::error(400, "'name' and 'email' are required");
    };
    let id = USERS.iter().map(|u| u.0).max().unwrap_or(0) + 1;
    HandlerResult::status(
        201,
        json!({
            "message": "User added successfully",
            "user": { "id": id, "name": name, "email": email },
        }),
    )
}

fn show(req: &RequestEnvelope) -> HandlerResult {
    let id = req.param("id").unwrap_or_default();
    match USERS.iter().find(|u| u.0.to_string() == id) {
        Some(user) => HandlerResult::ok(json!({ "user": user_json(user) })),
        None => HandlerResult::error(404, format!("User with id {id} not found")),
    }
}

fn update(req: &RequestEnvelope) -> HandlerResult {
    let id = req.param("id").unwrap_or_default();
    let updates = match json_body(req) {
        Ok(data) => data,
        Err(response) => return response,
    };
    HandlerResult::ok(json!({
        "message": format!("User {id} updated"),
        "updates": updates,
        "userId": id,
    }))
}

fn remove(req: &RequestEnvelope) -> HandlerResult {
    let id = req.param("id").unwrap_or_default();
    HandlerResult::ok(json!({ "message": format!("User {id} deleted"), "userId": id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{normalize, Params, RawRequest};
    use crate::handler::Method;

    fn with_id(id: &str) -> RequestEnvelope {
        let params: Params = [("id".to_string(), id.to_string())].into_iter().collect();
        RequestEnvelope::build(RawRequest::new("GET", format!("/api/users/{id}")), Method::Get, params)
    }

    #[test]
    fn test_show() {
        let found = normalize(show(&with_id("42"))).unwrap();
        assert_eq!(found.status, 200);
        assert_eq!(found.body["user"]["name"], "Test User");

        let missing = normalize(show(&with_id("7"))).unwrap();
        assert_eq!(missing.status, 404);
    }

    #[test]
    fn test_list() {
        let response = normalize(list(&with_id("x"))).unwrap();
        assert_eq!(response.body["data"]["users_count"], USERS.len());
    }
}
