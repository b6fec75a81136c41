//! Query string parsing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A query parameter value: a single string, or every value of a repeated key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

impl QueryValue {
    /// First value for the key.
    pub fn first(&self) -> &str {
        match self {
            QueryValue::One(v) => v,
            QueryValue::Many(vs) => vs.first().map(String::as_str).unwrap_or(""),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            QueryValue::One(existing) => {
                let first = std::mem::take(existing);
                *self = QueryValue::Many(vec![first, value]);
            }
            QueryValue::Many(values) => values.push(value),
        }
    }
}

/// Parsed query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(BTreeMap<String, QueryValue>);

impl Query {
    /// Parse `a=1&b=2&a=3` with form-urlencoded rules. `+` decodes to a space
    /// and a key without `=` maps to an empty string.
    pub fn parse(query: &str) -> Self {
        let mut map: BTreeMap<String, QueryValue> = BTreeMap::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.into_owned();
            match map.get_mut(&*key) {
                Some(existing) => existing.push(value),
                None => {
                    map.insert(key.into_owned(), QueryValue::One(value));
                }
            }
        }
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
