//! Handler result normalization.
//!
//! # Responsibilities
//! - Accept structured results and pre-serialized JSON strings alike
//! - Validate the `{status, body}` shape
//! - Produce the uniform response envelope
//!
//! # Design Decisions
//! - A string result is parsed and then takes the exact same path as a
//!   structured one, so both serialize byte-for-byte identically
//! - Missing `status` defaults to 200; `body` is required (may be `null`)
//! - Extra top-level keys are ignored

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default status for a result that omits `status`.
pub const DEFAULT_STATUS: u16 = 200;

/// What a handler returns.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerResult {
    /// A structured `{status, body}` value.
    Value(Value),
    /// A pre-serialized JSON document of the same shape.
    Text(String),
}

impl HandlerResult {
    /// Structured result with an explicit status.
    pub fn status(status: u16, body: impl Into<Value>) -> Self {
        let mut map = Map::new();
        map.insert("status".to_string(), Value::from(status));
        map.insert("body".to_string(), body.into());
        HandlerResult::Value(Value::Object(map))
    }

    /// `200` with the given body.
    pub fn ok(body: impl Into<Value>) -> Self {
        Self::status(200, body)
    }

    /// Error result with a `{error: message}` body.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::status(status, serde_json::json!({ "error": message.into() }))
    }
}

impl From<Value> for HandlerResult {
    fn from(value: Value) -> Self {
        HandlerResult::Value(value)
    }
}

impl From<String> for HandlerResult {
    fn from(text: String) -> Self {
        HandlerResult::Text(text)
    }
}

/// The uniform response sent back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub body: Value,
}

impl ResponseEnvelope {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Best-effort `{error: message}` response.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::new(status, serde_json::json!({ "error": message.into() }))
    }

    /// Serialize the full envelope as a single JSON document.
    pub fn to_json(&self) -> String {
        // Serializing a u16 and a Value cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"status":{},"body":null}}"#, self.status)
        })
    }

    /// Serialize only the body; this is the HTTP payload.
    pub fn body_json(&self) -> String {
        self.body.to_string()
    }
}

/// Why a handler result could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("handler output is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("handler output must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("handler output is missing the `body` field")]
    MissingBody,
    #[error("handler output has an invalid `status`: {0}")]
    InvalidStatus(String),
}

/// Convert a raw handler result into a [`ResponseEnvelope`].
pub fn normalize(result: HandlerResult) -> Result<ResponseEnvelope, NormalizeError> {
    let value = match result {
        HandlerResult::Value(value) => value,
        HandlerResult::Text(text) => serde_json::from_str(&text)
            .map_err(|e| NormalizeError::InvalidJson(e.to_string()))?,
    };

    let mut object = match value {
        Value::Object(map) => map,
        other => return Err(NormalizeError::NotAnObject(kind_of(&other))),
    };

    let status = match object.get("status") {
        None => DEFAULT_STATUS,
        Some(raw) => parse_status(raw)?,
    };
    let body = object.remove("body").ok_or(NormalizeError::MissingBody)?;

    Ok(ResponseEnvelope { status, body })
}

fn parse_status(raw: &Value) -> Result<u16, NormalizeError> {
    raw.as_u64()
        .filter(|code| (100..=599).contains(code))
        .map(|code| code as u16)
        .ok_or_else(|| NormalizeError::InvalidStatus(raw.to_string()))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
