//! Header map with lowercase keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Request headers as handed to handlers.
///
/// Keys are lowercased on insert so lookup is case-insensitive; values are
/// kept exactly as received. Repeated headers are combined with `", "` in
/// arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header value, combining with an existing value of the same name.
    pub fn append(&mut self, name: &str, value: &str) {
        self.0
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.append(k.as_ref(), v.as_ref());
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let headers: Headers = [("Content-Type", "application/JSON")].into_iter().collect();
        assert_eq!(headers.get("content-type"), Some("application/JSON"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/JSON"));
        assert_eq!(headers.get("accept"), None);
    }

    #[test]
    fn test_repeated_headers_are_combined() {
        let headers: Headers = [("Accept", "text/html"), ("accept", "application/json")]
            .into_iter()
            .collect();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Accept"), Some("text/html, application/json"));
    }

    #[test]
    fn test_serializes_with_lowercase_keys() {
        let headers: Headers = [("X-Request-Id", "abc")].into_iter().collect();
        let json = serde_json::to_string(&headers).unwrap();
        assert_eq!(json, r#"{"x-request-id":"abc"}"#);
    }
}
