//! Server time endpoint.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::json;

use crate::envelope::{HandlerResult, RequestEnvelope};
use crate::handler::{HandlerModule, ModuleRef, NativeModule};
use crate::handlers::{json_body, str_field};

pub fn module() -> ModuleRef {
    HandlerModule::native(NativeModule::new("time").get(get).post(post))
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn get(_req: &RequestEnvelope) -> HandlerResult {
    let now = now_millis();
    HandlerResult::ok(json!({
        "timestamp": now,
        "iso": iso8601(now),
        "message": "Current server time",
    }))
}

fn post(req: &RequestEnvelope) -> HandlerResult {
    let data = match json_body(req) {
        Ok(data) => data,
        Err(response) => return response,
    };
    let timezone = str_field(&data, "timezone").unwrap_or("UTC");
    HandlerResult::ok(json!({
        "message": format!("Received request for timezone {timezone}"),
        "iso": iso8601(now_millis()),
    }))
}

/// Format milliseconds since the epoch as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
fn iso8601(millis: u64) -> String {
    let secs = millis / 1000;
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;

    // Civil date from days since 1970-01-01 (proleptic Gregorian).
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);

    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{:03}Z",
        rem / 3600,
        rem % 3600 / 60,
        rem % 60,
        millis % 1000
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso8601() {
        assert_eq!(iso8601(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(iso8601(951_782_400_123), "2000-02-29T00:00:00.123Z");
        assert_eq!(iso8601(1_700_000_000_000), "2023-11-14T22:13:20.000Z");
    }
}
