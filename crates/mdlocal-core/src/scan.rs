//! Markdown document discovery.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::ScanError;

/// Recursively lists every `.md` file (case-insensitive) under `root`.
///
/// Paths are absolute and sorted. Unreadable subdirectories are logged and
/// skipped; only a missing or non-directory `root` is an error.
pub fn scan_directory(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !root.exists() {
        return Err(ScanError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    let root = absolute(root);

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if entry.path().is_file() && is_markdown(entry.file_name().to_string_lossy().as_ref()) {
            files.push(entry.into_path());
        }
    }
    tracing::info!(root = %root.display(), count = files.len(), "scanned for Markdown files");
    Ok(files)
}

fn is_markdown(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".md")
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
