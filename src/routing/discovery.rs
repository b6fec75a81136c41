//! Route discovery from a handler directory.
//!
//! # Responsibilities
//! - Walk the routes directory in a deterministic order
//! - Select handler files by extension
//! - Derive each file's URL pattern from its relative path
//!
//! # Design Decisions
//! - One file = one route; nesting mirrors URL nesting
//! - The extension selects the language and never appears in the URL
//! - `index.<ext>` serves its directory's path
//! - Hidden files and directories are skipped

use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::handler::Language;
use crate::routing::pattern::{Pattern, PatternError};
use crate::routing::RouteError;

/// A handler file found under the routes directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub pattern: Pattern,
    pub path: PathBuf,
    pub language: Language,
}

/// Walk `dir` and return every handler file with its URL pattern, in
/// file-name order.
pub fn discover(dir: &Path, prefix: &str) -> Result<Vec<DiscoveredFile>, RouteError> {
    if !dir.is_dir() {
        return Err(RouteError::Io {
            path: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "routes directory not found"),
        });
    }

    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(language) = Language::from_path(path) else {
            tracing::debug!(path = %path.display(), "Skipping non-handler file");
            continue;
        };

        let relative = path.strip_prefix(dir).unwrap_or(path);
        let pattern = pattern_for(relative, prefix)?;
        files.push(DiscoveredFile {
            pattern,
            path: path.to_path_buf(),
            language,
        });
    }

    Ok(files)
}

/// Derive the URL pattern for a handler file path relative to the routes
/// directory: `users/[id].js` under prefix `/api` becomes `/api/users/[id]`.
pub fn pattern_for(relative: &Path, prefix: &str) -> Result<Pattern, PatternError> {
    let mut url = prefix.trim_end_matches('/').to_string();

    let mut parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if let Some(file) = parts.pop() {
        let stem = Path::new(&file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(file);
        if stem != "index" {
            parts.push(stem);
        }
    }

    for part in parts {
        url.push('/');
        url.push_str(&part);
    }
    if url.is_empty() {
        url.push('/');
    }

    Pattern::parse(&url)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}
