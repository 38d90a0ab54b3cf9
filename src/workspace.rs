use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Grace period before deleting state, so handles released by the caller
/// (e.g. a dropped index) are really closed on platforms that lag.
const RESET_SETTLE: Duration = Duration::from_millis(300);

/// On-disk layout: the working copy of the repo and the index built from it.
#[derive(Debug, Clone)]
pub struct Workspace {
    repo_dir: PathBuf,
    index_dir: PathBuf,
}

impl Workspace {
    pub fn new(repo_dir: PathBuf, index_dir: PathBuf) -> Self {
        Self {
            repo_dir,
            index_dir,
        }
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.repo_dir)
            .with_context(|| format!("Failed to create {}", self.repo_dir.display()))?;
        std::fs::create_dir_all(&self.index_dir)
            .with_context(|| format!("Failed to create {}", self.index_dir.display()))?;
        Ok(())
    }

    /// Empty the repo directory, leaving it in place.
    pub fn clear_repo(&self) -> Result<()> {
        recreate_dir(&self.repo_dir)
    }

    /// Empty the index directory, leaving it in place.
    pub fn clear_index(&self) -> Result<()> {
        recreate_dir(&self.index_dir)
    }

    /// Delete both directories. A failed delete is retried once after
    /// clearing read-only flags under the tree.
    pub async fn reset(&self) -> Result<()> {
        tokio::time::sleep(RESET_SETTLE).await;

        for dir in [self.repo_dir.clone(), self.index_dir.clone()] {
            tokio::task::spawn_blocking(move || force_remove_dir_all(&dir))
                .await
                .context("Reset task failed")??;
        }
        Ok(())
    }
}

fn recreate_dir(dir: &Path) -> Result<()> {
    force_remove_dir_all(dir)?;
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))
}

/// Remove `dir` and everything under it. Missing directories are fine.
pub fn force_remove_dir_all(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }

    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(first) => {
            tracing::warn!(
                "Failed to remove {} ({first}), clearing read-only flags and retrying",
                dir.display()
            );
            make_tree_writable(dir);
            std::fs::remove_dir_all(dir)
                .with_context(|| format!("Failed to remove {}", dir.display()))
        }
    }
}

// Git marks pack files read-only, which blocks deletion on Windows.
#[allow(clippy::permissions_set_readonly_false)]
fn make_tree_writable(dir: &Path) {
    for entry in walkdir::WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        if let Ok(meta) = entry.metadata() {
            let mut perms = meta.permissions();
            if perms.readonly() {
                perms.set_readonly(false);
                let _ = std::fs::set_permissions(entry.path(), perms);
            }
        }
    }
}
