use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::IndexConfig;

/// A source file picked up for indexing.
#[derive(Debug, Clone)]
pub struct RepoFile {
    /// Path as walked, i.e. joined onto the repo directory.
    pub path: PathBuf,
    pub content: String,
}

/// Walk `repo_dir` and read every file whose name ends in one of the
/// configured extensions. Unreadable files are skipped.
pub fn walk_repo_files(repo_dir: &Path, config: &IndexConfig) -> Vec<RepoFile> {
    let mut files = Vec::new();

    for entry in WalkDir::new(repo_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_ignored_dir(e))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !has_indexable_extension(path, &config.extensions) {
            continue;
        }

        if let Ok(meta) = entry.metadata() {
            if meta.len() > config.max_file_bytes {
                tracing::debug!("Skipping {} ({} bytes)", path.display(), meta.len());
                continue;
            }
        }

        match std::fs::read(path) {
            Ok(bytes) => files.push(RepoFile {
                path: path.to_path_buf(),
                content: decode_ignoring_errors(&bytes),
            }),
            Err(e) => {
                tracing::debug!("Skipping unreadable {}: {e}", path.display());
            }
        }
    }

    files
}

fn is_ignored_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    matches!(
        name.as_ref(),
        ".git" | ".hg" | ".svn" | "node_modules" | "target" | "__pycache__" | "venv" | ".venv"
    )
}

/// Case-sensitive suffix match, so `README.MD` is not picked up by `.md`.
fn has_indexable_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy();
    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

/// Decode UTF-8, dropping invalid byte sequences rather than replacing them.
fn decode_ignoring_errors(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let mut out = String::with_capacity(bytes.len());
            for chunk in bytes.utf8_chunks() {
                out.push_str(chunk.valid());
            }
            out
        }
    }
}
