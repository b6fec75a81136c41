//! Path matching.
//!
//! # Responsibilities
//! - Normalize the request path (query, trailing slash, percent-encoding)
//! - Walk the segment trie to find the most specific route
//! - Capture dynamic segment values
//!
//! # Design Decisions
//! - Literal children are tried before dynamic children at every depth, with
//!   backtracking, so the literal route always wins but deeper dynamic routes
//!   stay reachable
//! - A single trailing slash is ignored; `/` is the root
//! - Empty segments (`/api//users`) never match
//! - No match is a normal outcome (`None`), not an error

use std::borrow::Cow;
use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use crate::envelope::request::split_url;
use crate::envelope::Params;
use crate::routing::pattern::{Pattern, Segment};

#[derive(Debug, Default)]
struct Node {
    literals: HashMap<String, Node>,
    /// Dynamic children in registration order, keyed by parameter name.
    params: Vec<(String, Node)>,
    route: Option<usize>,
}

/// Segment trie over registered patterns. Values are route indices.
#[derive(Debug, Default)]
pub struct PathMatcher {
    root: Node,
}

impl PathMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `pattern`. Returns the index already stored for a pattern with
    /// the same segments, leaving it in place.
    pub fn insert(&mut self, pattern: &Pattern, route: usize) -> Result<(), usize> {
        let mut node = &mut self.root;
        for segment in pattern.segments() {
            node = match segment {
                Segment::Literal(lit) => node.literals.entry(lit.clone()).or_default(),
                Segment::Param(name) => {
                    let pos = match node.params.iter().position(|(n, _)| n == name) {
                        Some(pos) => pos,
                        None => {
                            node.params.push((name.clone(), Node::default()));
                            node.params.len() - 1
                        }
                    };
                    &mut node.params[pos].1
                }
            };
        }

        match node.route {
            Some(existing) => Err(existing),
            None => {
                node.route = Some(route);
                Ok(())
            }
        }
    }

    /// Find the route for a request path and capture its parameters.
    pub fn find(&self, path: &str) -> Option<(usize, Params)> {
        let segments = normalize_path(path)?;
        let mut bindings = Vec::new();
        let route = walk(&self.root, &segments, &mut bindings)?;
        let params = bindings
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Some((route, params))
    }
}

fn walk<'n, 's>(
    node: &'n Node,
    segments: &'s [Cow<'s, str>],
    bindings: &mut Vec<(&'n str, &'s str)>,
) -> Option<usize> {
    let Some((head, tail)) = segments.split_first() else {
        return node.route;
    };

    if let Some(child) = node.literals.get(&**head) {
        if let Some(route) = walk(child, tail, bindings) {
            return Some(route);
        }
    }

    for (name, child) in &node.params {
        bindings.push((name.as_str(), &**head));
        if let Some(route) = walk(child, tail, bindings) {
            return Some(route);
        }
        bindings.pop();
    }

    None
}

/// Split a request path into decoded segments.
///
/// Returns `None` for paths that can never match: not starting with `/`, or
/// containing an empty segment.
pub fn normalize_path(url: &str) -> Option<Vec<Cow<'_, str>>> {
    let path = split_url(url).0;
    let path = if path.is_empty() { "/" } else { path };
    let trimmed = if path.len() > 1 && !path.ends_with("//") {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    };

    let rest = trimmed.strip_prefix('/')?;
    if rest.is_empty() {
        return Some(Vec::new());
    }

    rest.split('/')
        .map(|s| (!s.is_empty()).then(|| percent_decode_str(s).decode_utf8_lossy()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(patterns: &[&str]) -> PathMatcher {
        let mut m = PathMatcher::new();
        for (i, p) in patterns.iter().enumerate() {
            m.insert(&Pattern::parse(p).unwrap(), i).unwrap();
        }
        m
    }

    fn param(params: &Params, name: &str) -> Option<String> {
        params.get(name).cloned()
    }

    #[test]
    fn test_static_routes_match_exactly() {
        let m = matcher(&["/api/users", "/api/users/list"]);
        assert_eq!(m.find("/api/users").map(|r| r.0), Some(0));
        assert_eq!(m.find("/api/users/list").map(|r| r.0), Some(1));
        assert!(m.find("/api/users/42").is_none());
        assert!(m.find("/api").is_none());
        assert!(m.find("/API/users").is_none());
    }

    #[test]
    fn test_dynamic_segment_binds_value() {
        let m = matcher(&["/api/users/[id]"]);
        for id in ["42", "abc", "a.b-c"] {
            let (route, params) = m.find(&format!("/api/users/{id}")).unwrap();
            assert_eq!(route, 0);
            assert_eq!(param(&params, "id").as_deref(), Some(id));
        }
        assert!(m.find("/api/users/42/extra").is_none());
        assert!(m.find("/api/users").is_none());
    }

    #[test]
    fn test_literal_beats_dynamic_at_same_depth() {
        let m = matcher(&["/api/users/[id]", "/api/users/me"]);
        let (route, params) = m.find("/api/users/me").unwrap();
        assert_eq!(route, 1);
        assert!(params.is_empty());
        assert_eq!(m.find("/api/users/7").unwrap().0, 0);
    }

    #[test]
    fn test_literal_beats_dynamic_at_every_depth() {
        let m = matcher(&["/[org]/repos/[repo]", "/acme/repos/[repo]", "/acme/repos/core"]);
        assert_eq!(m.find("/acme/repos/core").unwrap().0, 2);
        assert_eq!(m.find("/acme/repos/web").unwrap().0, 1);
        let (route, params) = m.find("/globex/repos/core").unwrap();
        assert_eq!(route, 0);
        assert_eq!(param(&params, "org").as_deref(), Some("globex"));
        assert_eq!(param(&params, "repo").as_deref(), Some("core"));
    }

    #[test]
    fn test_backtracks_from_literal_into_dynamic() {
        let m = matcher(&["/users/me", "/users/[id]/posts"]);
        let (route, params) = m.find("/users/me/posts").unwrap();
        assert_eq!(route, 1);
        assert_eq!(param(&params, "id").as_deref(), Some("me"));
    }

    #[test]
    fn test_trailing_slash_is_normalized() {
        let m = matcher(&["/api/users", "/api/users/[id]", "/"]);
        assert_eq!(m.find("/api/users/").unwrap().0, 0);
        assert_eq!(m.find("/api/users/5/").unwrap().0, 1);
        assert_eq!(m.find("/").unwrap().0, 2);
        assert_eq!(m.find("").unwrap().0, 2);
    }

    #[test]
    fn test_empty_segments_never_match() {
        let m = matcher(&["/api/users", "/api/[x]/users"]);
        assert!(m.find("/api//users").is_none());
        assert!(m.find("/api/users//").is_none());
        assert!(m.find("//").is_none());
    }

    #[test]
    fn test_query_and_percent_decoding() {
        let m = matcher(&["/files/[name]", "/a b"]);
        let (_, params) = m.find("/files/report%202024.pdf?download=1").unwrap();
        assert_eq!(param(&params, "name").as_deref(), Some("report 2024.pdf"));
        assert_eq!(m.find("/a%20b").unwrap().0, 1);
    }

    #[test]
    fn test_insert_reports_existing_route() {
        let mut m = PathMatcher::new();
        let p = Pattern::parse("/api/users").unwrap();
        m.insert(&p, 0).unwrap();
        assert_eq!(m.insert(&p, 1), Err(0));
    }

    #[test]
    fn test_relative_path_never_matches() {
        let m = matcher(&["/api"]);
        assert!(m.find("api").is_none());
    }
}
