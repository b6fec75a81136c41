//! Built-in native handler modules.
//!
//! These are ordinary handler modules written in Rust. They are registered
//! before the routes directory is scanned, so a script file that maps to one
//! of their patterns is a duplicate route.

use serde_json::{Map, Value};

use crate::envelope::{HandlerResult, RequestEnvelope};
use crate::routing::{RouteError, RouteTable};

pub mod hello;
pub mod time;
pub mod users;
pub mod watchlist;

/// Register every built-in module under `prefix`.
pub fn mount(table: &mut RouteTable, prefix: &str) -> Result<(), RouteError> {
    let prefix = prefix.trim_end_matches('/');
    table.register(&format!("{prefix}/hello"), hello::module())?;
    table.register(&format!("{prefix}/time"), time::module())?;
    table.register(&format!("{prefix}/users"), users::list_module())?;
    table.register(&format!("{prefix}/users/[id]"), users::item_module())?;
    table.register(&format!("{prefix}/watchlist"), watchlist::module())?;
    Ok(())
}

/// Parse the request body as a JSON object, or produce the 400 to return.
pub(crate) fn json_body(req: &RequestEnvelope) -> Result<Map<String, Value>, HandlerResult> {
    let Some(body) = req.body() else {
        return Err(HandlerResult::error(400, "request body is required"));
    };
    match serde_json::from_str(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(HandlerResult::error(400, "request body must be a JSON object")),
        Err(e) => Err(HandlerResult::error(400, format!("invalid JSON body: {e}"))),
    }
}

/// `field` as a non-empty string.
pub(crate) fn str_field<'a>(data: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    data.get(field).and_then(Value::as_str).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{Params, RawRequest};
    use crate::handler::Method;

    #[test]
    fn test_mount_registers_all_modules() {
        let mut table = RouteTable::new();
        mount(&mut table, "/api/").unwrap();
        assert_eq!(table.len(), 5);
        assert!(table.resolve("/api/users/7").is_some());
        assert!(mount(&mut table, "/api").is_err());
    }

    #[test]
    fn test_json_body() {
        let req = |body: Option<&str>| {
            let mut raw = RawRequest::new("POST", "/");
            raw.body = body.map(str::to_string);
            RequestEnvelope::build(raw, Method::Post, Params::new())
        };

        assert!(json_body(&req(Some(r#"{"a":1}"#))).is_ok());
        for bad in [None, Some("[1]"), Some("{")] {
            let err = json_body(&req(bad)).unwrap_err();
            assert!(matches!(err, HandlerResult::Value(ref v) if v["status"] == 400));
        }
    }
}
