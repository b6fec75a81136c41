//! Request envelope construction.
//!
//! # Responsibilities
//! - Split the raw URL into path and query string
//! - Parse the query string
//! - Normalize header keys for lookup
//! - Merge path parameters captured by the matcher
//!
//! # Design Decisions
//! - The body is passed through unparsed; each handler decides its own
//!   content type
//! - An empty body is treated as absent
//! - The envelope is immutable once built; handlers only ever see `&RequestEnvelope`

use std::collections::BTreeMap;

use serde::Serialize;

use crate::envelope::headers::Headers;
use crate::envelope::query::Query;
use crate::handler::Method;

/// Path parameters captured from dynamic segments.
pub type Params = BTreeMap<String, String>;

/// An inbound request as produced by the transport layer.
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    /// Method token as received (e.g. `"GET"`).
    pub method: String,
    /// Path plus optional query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RawRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The path component of the URL, without query string or fragment.
    pub fn path(&self) -> &str {
        split_url(&self.url).0
    }
}

/// Split `path?query#fragment` into `(path, query)`.
pub fn split_url(url: &str) -> (&str, &str) {
    let without_fragment = url.split_once('#').map_or(url, |(before, _)| before);
    match without_fragment.split_once('?') {
        Some((path, query)) => (path, query),
        None => (without_fragment, ""),
    }
}

/// The canonical request handed to every handler, whatever its language.
///
/// Serializes to `{url, headers, method, body, params, query}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestEnvelope {
    url: String,
    headers: Headers,
    method: Method,
    body: Option<String>,
    params: Params,
    query: Query,
}

impl RequestEnvelope {
    /// Build the envelope for a resolved request.
    pub fn build(raw: RawRequest, method: Method, params: Params) -> Self {
        let query = Query::parse(split_url(&raw.url).1);
        let headers = raw.headers.iter().map(|(k, v)| (k, v)).collect::<Headers>();
        let body = raw.body.filter(|b| !b.is_empty());

        Self {
            url: raw.url,
            headers,
            method,
            body,
            params,
            query,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Raw body, if any.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The canonical JSON representation handed to foreign runtimes.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
