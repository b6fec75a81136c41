//! URL patterns.
//!
//! A pattern is an ordered list of segments. `[name]` marks a dynamic segment
//! that captures exactly one non-empty path component; anything else is a
//! literal.

use std::fmt;

/// One component of a URL pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// Error parsing a pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route pattern `{pattern}`: {reason}")]
pub struct PatternError {
    pub pattern: String,
    pub reason: &'static str,
}

/// A parsed URL pattern such as `/api/users/[id]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parse a pattern. A trailing slash is ignored, so `/api/users/` and
    /// `/api/users` are the same pattern.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let invalid = |reason| PatternError {
            pattern: pattern.to_string(),
            reason,
        };

        let rest = pattern
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with `/`"))?;
        let rest = rest.strip_suffix('/').unwrap_or(rest);
        if rest.is_empty() {
            return Ok(Self { segments: Vec::new() });
        }

        let mut segments = Vec::new();
        for raw in rest.split('/') {
            if raw.is_empty() {
                return Err(invalid("empty segment"));
            }
            let segment = match raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
                Some("") => return Err(invalid("empty parameter name")),
                Some(name) if name.contains(['[', ']']) => {
                    return Err(invalid("nested brackets in parameter name"))
                }
                Some(name) => {
                    if segments.iter().any(|s| matches!(s, Segment::Param(n) if n == name)) {
                        return Err(invalid("duplicate parameter name"));
                    }
                    Segment::Param(name.to_string())
                }
                None if raw.contains(['[', ']']) => return Err(invalid("unbalanced brackets")),
                None => Segment::Literal(raw.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_static(&self) -> bool {
        self.segments.iter().all(|s| matches!(s, Segment::Literal(_)))
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Key identifying which paths this pattern can match. Two patterns with
    /// the same shape differ at most in parameter names and are ambiguous.
    pub fn shape(&self) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(lit) => format!("/{lit}"),
                Segment::Param(_) => "/[]".to_string(),
            })
            .collect()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => write!(f, "/{lit}")?,
                Segment::Param(name) => write!(f, "/[{name}]")?,
            }
        }
        Ok(())
    }
}
