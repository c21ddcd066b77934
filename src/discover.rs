//! Source file discovery.

use std::path::{Path, PathBuf};

use tracing::info;
use walkdir::WalkDir;

use crate::error::DiscoverError;
use crate::Language;

/// Produce the ordered list of source files for `language` under `root`.
///
/// A missing root is fatal; a file is returned as-is; a directory is walked
/// recursively and the result sorted so runs are deterministic.
pub fn discover_sources(root: &Path, language: Language) -> Result<Vec<PathBuf>, DiscoverError> {
    if !root.exists() {
        return Err(DiscoverError::PathNotFound(root.to_path_buf()));
    }
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| DiscoverError::Io {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            message: e.to_string(),
        })?;
        if entry.file_type().is_file() && matches_extension(entry.path(), language) {
            sources.push(entry.into_path());
        }
    }
    sources.sort();

    info!(
        "discovered {} source file(s) under {}",
        sources.len(),
        root.display()
    );
    Ok(sources)
}

fn matches_extension(path: &Path, language: Language) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => language.extensions().contains(&ext),
        None => false,
    }
}
