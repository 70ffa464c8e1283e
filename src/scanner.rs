//! Go source tree scanner.
//!
//! Recursively walks a directory to collect `.go` files. The root is always
//! entered; below it, directories whose names start with `.` and `vendor`
//! directories are skipped entirely, as are `.go` files whose names start
//! with `.`. Extra glob patterns can exclude further entries.

use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};

const VENDOR_DIR: &str = "vendor";

/// Collects all eligible `.go` files under `root` in sorted, depth-first order.
///
/// `exclude` holds glob patterns matched against both the entry name and its
/// path relative to `root`.
pub fn collect_go_files(root: &Path, exclude: &[String]) -> Result<Vec<PathBuf>> {
    let patterns = compile_patterns(exclude)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !(is_skipped_dir(e) || is_excluded(e, root, &patterns)))
    {
        let entry = entry.map_err(|source| {
            let path = source.path().unwrap_or(root).to_path_buf();
            Error::Walk { path, source }
        })?;
        if entry.file_type().is_file() && is_go_source(&entry) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn compile_patterns(exclude: &[String]) -> Result<Vec<Pattern>> {
    exclude
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|source| Error::Pattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || name == VENDOR_DIR)
}

fn is_excluded(entry: &DirEntry, root: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
    patterns
        .iter()
        .any(|pattern| pattern.matches(&name) || pattern.matches_path(relative))
}

fn is_go_source(entry: &DirEntry) -> bool {
    let hidden = entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'));
    !hidden && entry.path().extension().is_some_and(|ext| ext == "go")
}
