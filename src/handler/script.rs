//! Script handler modules (JavaScript, TypeScript, Python, Ruby).
//!
//! # Responsibilities
//! - Read a handler file once at load time
//! - Detect which method-named functions it declares
//!
//! # Design Decisions
//! - Only top-level declarations (column 0) count
//! - The stored path is absolute, so interpreters can run from any directory
//! - Detection is a line scan, not a parse; the foreign runtime remains the
//!   authority on whether the function actually runs

use std::path::{Path, PathBuf};

use crate::handler::{Language, Method, MethodSet};

/// Error loading a script module.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{}: unsupported handler file extension", path.display())]
    Unsupported { path: PathBuf },
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A handler module backed by a source file executed by a foreign runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptModule {
    path: PathBuf,
    language: Language,
    methods: MethodSet,
}

impl ScriptModule {
    /// Read `path` and resolve its exported methods.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let language = Language::from_path(path).ok_or_else(|| LoadError::Unsupported {
            path: path.to_path_buf(),
        })?;
        let io = |source: std::io::Error| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let absolute = std::fs::canonicalize(path).map_err(io)?;
        let source = std::fs::read_to_string(&absolute).map_err(io)?;

        let methods = declared_methods(language, &source);
        if methods.is_empty() {
            tracing::warn!(path = %path.display(), "Handler file declares no method functions");
        }

        Ok(Self {
            path: absolute,
            language,
            methods,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn methods(&self) -> MethodSet {
        self.methods
    }
}

/// Scan `source` for top-level method-named function declarations.
pub fn declared_methods(language: Language, source: &str) -> MethodSet {
    source
        .lines()
        .flat_map(|line| match language {
            Language::JavaScript | Language::TypeScript => js_declarations(line),
            Language::Python => python_declaration(line).into_iter().collect(),
            Language::Ruby => ruby_declaration(line).into_iter().collect(),
            Language::Rust => Vec::new(),
        })
        .collect()
}

fn js_declarations(line: &str) -> Vec<Method> {
    let mut rest = line;
    for prefix in ["export ", "async "] {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped.trim_start();
        }
    }

    if let Some(after) = rest.strip_prefix("function") {
        let after = after.trim_start_matches('*').trim_start();
        return leading_method(after).into_iter().collect();
    }

    for binding in ["const ", "let ", "var "] {
        if let Some(after) = rest.strip_prefix(binding) {
            return assigned_method(after.trim_start()).into_iter().collect();
        }
    }

    for target in ["module.exports.", "exports."] {
        if let Some(after) = rest.strip_prefix(target) {
            return assigned_method(after).into_iter().collect();
        }
    }

    // `module.exports = { GET, POST }` or `export { GET, POST }`
    let exported = if line.starts_with("export ") {
        Some(rest)
    } else {
        rest.strip_prefix("module.exports")
            .and_then(|r| r.trim_start().strip_prefix('='))
    };
    let list = exported
        .map(str::trim_start)
        .and_then(|r| r.strip_prefix('{'))
        .and_then(|r| r.split_once('}').map(|(inner, _)| inner));

    match list {
        Some(inner) => inner
            .split(',')
            .filter_map(|item| {
                let item = item.trim();
                let exported = item
                    .split_once(" as ")
                    .map(|(_, alias)| alias)
                    .or_else(|| item.split_once(':').map(|(key, _)| key))
                    .unwrap_or(item);
                leading_method(exported.trim())
            })
            .collect(),
        None => Vec::new(),
    }
}

fn python_declaration(line: &str) -> Option<Method> {
    let rest = line.strip_prefix("async ").unwrap_or(line);
    let name = rest.strip_prefix("def ")?.trim_start();
    let method = leading_method(name)?;
    name[method.as_str().len()..]
        .trim_start()
        .starts_with('(')
        .then_some(method)
}

fn ruby_declaration(line: &str) -> Option<Method> {
    let name = line.strip_prefix("def ")?.trim_start();
    leading_method(name)
}

/// `NAME = ...` where NAME is a method token.
fn assigned_method(s: &str) -> Option<Method> {
    let method = leading_method(s)?;
    let rest = s[method.as_str().len()..].trim_start();
    let assigned = match rest.strip_prefix(':') {
        // TypeScript type annotation
        Some(annotated) => annotated.contains('='),
        None => rest.starts_with('=') && !rest.starts_with("=="),
    };
    assigned.then_some(method)
}

/// The identifier at the start of `s`, if it is exactly a method token.
fn leading_method(s: &str) -> Option<Method> {
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
        .unwrap_or(s.len());
    s[..end].parse().ok()
}
