//! Resolving command-line arguments to distribution files.
//!
//! Each argument is either an existing path or a glob pattern. Patterns are
//! expanded with `globset` over a `walkdir` traversal rooted at the
//! pattern's literal prefix. Wheels are ordered before other artifacts so an
//! index sees the built distribution first.

use globset::GlobBuilder;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Errors from resolving distribution arguments
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("Cannot find file (or expand pattern): '{0}'")]
    NotFound(String),

    #[error("Glob pattern error: {0}")]
    GlobError(#[from] globset::Error),

    #[error("Walk error: {0}")]
    WalkError(#[from] walkdir::Error),
}

/// Source of the artifact list for a check run.
pub trait DistributionLocator {
    fn find_distributions(&self, patterns: &[String]) -> Result<Vec<PathBuf>, LocateError>;
}

/// Locator backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobLocator;

impl DistributionLocator for GlobLocator {
    fn find_distributions(&self, patterns: &[String]) -> Result<Vec<PathBuf>, LocateError> {
        let mut found = Vec::new();
        for pattern in patterns {
            let path = Path::new(pattern);
            if path.exists() {
                found.push(path.to_path_buf());
                continue;
            }

            let matches = expand_pattern(pattern)?;
            if matches.is_empty() {
                return Err(LocateError::NotFound(pattern.clone()));
            }
            found.extend(matches);
        }
        Ok(wheels_first(found))
    }
}

fn has_glob_meta(text: &str) -> bool {
    text.chars().any(|c| matches!(c, '*' | '?' | '[' | '{'))
}

/// Expand a glob pattern to the sorted list of matching files.
pub fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>, LocateError> {
    if !has_glob_meta(pattern) {
        return Ok(Vec::new());
    }

    // Split into the literal directory prefix and the globbed remainder.
    let mut base = PathBuf::new();
    let mut glob_depth = 0;
    for component in Path::new(pattern).components() {
        if glob_depth == 0 && !has_glob_meta(&component.as_os_str().to_string_lossy()) {
            base.push(component);
        } else {
            glob_depth += 1;
        }
    }

    let root = if base.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        base.clone()
    };
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()?
        .compile_matcher();

    let mut walker = WalkDir::new(&root).min_depth(1).sort_by_file_name();
    if !pattern.contains("**") {
        walker = walker.max_depth(glob_depth);
    }

    let mut matches = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let candidate = if base.as_os_str().is_empty() {
            entry.path().strip_prefix(".").unwrap_or(entry.path()).to_path_buf()
        } else {
            entry.path().to_path_buf()
        };
        if matcher.is_match(&candidate) {
            matches.push(candidate);
        }
    }
    matches.sort();
    Ok(matches)
}

fn is_wheel(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "whl")
}

/// Stable reorder putting wheels first.
pub fn wheels_first(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort_by_key(|path| !is_wheel(path));
    paths
}
