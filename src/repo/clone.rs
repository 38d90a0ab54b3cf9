use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

/// Why a clone did not produce a working copy.
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    /// `git` ran and exited non-zero; carries its stderr.
    #[error("git clone failed: {}", .stderr.trim())]
    Failed { stderr: String },

    /// `git` did not finish within the timeout and was killed.
    #[error("git clone timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    /// `git` could not be started at all.
    #[error("failed to run git: {0:#}")]
    Spawn(anyhow::Error),
}

/// Only allow remote URLs; local paths and `file://` would let a caller
/// copy arbitrary directories off the host.
pub fn validate_repo_url(url: &str) -> Result<()> {
    if url.is_empty() {
        anyhow::bail!("Repository URL is required");
    }
    if !url.starts_with("https://") && !url.starts_with("http://") && !url.starts_with("git://") {
        anyhow::bail!("Only https://, http://, and git:// URLs are allowed");
    }
    Ok(())
}

/// Derive a directory name from the last path segment of a repo URL,
/// dropping any query string and a trailing `.git`.
pub fn repo_name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    let name = segment.strip_suffix(".git").unwrap_or(segment);

    // The scheme-only case ("https://") leaves an empty or host-like segment.
    if name.is_empty() || name.contains(':') || name == "." || name == ".." {
        "repo".to_string()
    } else {
        name.to_string()
    }
}

/// Clone `url` into `target` with the `git` CLI.
pub async fn clone_repo(url: &str, target: &Path, timeout: Duration) -> Result<(), CloneError> {
    tracing::info!("Cloning {} into {}", url, target.display());

    let child = tokio::process::Command::new("git")
        .arg("clone")
        .arg(url)
        .arg(target)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .context("Failed to spawn git")
        .map_err(CloneError::Spawn)?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result
            .context("Failed to wait for git")
            .map_err(CloneError::Spawn)?,
        Err(_) => return Err(CloneError::TimedOut(timeout)),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        tracing::warn!("git clone of {url} exited with {}", output.status);
        return Err(CloneError::Failed { stderr });
    }

    tracing::info!("Clone complete: {}", target.display());
    Ok(())
}
