use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use std::time::Duration;

use crate::api::ApiError;
use crate::models::{IndexResponse, LoadGithubParams, LoadGithubResponse, MessageResponse};
use crate::rag::NothingToIndex;
use crate::repo::{self, CloneError};
use crate::state::AppState;
use crate::workspace::force_remove_dir_all;

/// POST /load-github?repo_url=... - Replace the workspace with a fresh clone
pub async fn load_github(
    State(state): State<AppState>,
    params: Result<Query<LoadGithubParams>, QueryRejection>,
) -> Result<Json<LoadGithubResponse>, ApiError> {
    let Query(params) =
        params.map_err(|e| ApiError::bad_request("repo_url is required").with_details(e.body_text()))?;

    let url = params.repo_url.trim().to_string();
    repo::validate_repo_url(&url)
        .map_err(|e| ApiError::bad_request("Invalid repository URL").with_details(e.to_string()))?;

    let _guard = state.workspace_lock.lock().await;

    // Clean previous state
    state.invalidate_index();
    let workspace = state.workspace.clone();
    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        workspace.clear_repo()?;
        workspace.clear_index()
    })
    .await
    .map_err(|e| ApiError::internal("Failed to prepare workspace").with_details(e.to_string()))?
    .map_err(|e| ApiError::internal("Failed to prepare workspace").with_details(format!("{e:#}")))?;

    let name = repo::repo_name_from_url(&url);
    let target = state.workspace.repo_dir().join(&name);
    let timeout = Duration::from_secs(state.config.clone_timeout_secs);

    match repo::clone_repo(&url, &target, timeout).await {
        Ok(()) => Ok(Json(LoadGithubResponse {
            message: "GitHub repo cloned successfully".to_string(),
            repo_path: target.display().to_string(),
        })),
        Err(e) => {
            tracing::error!("Failed to clone {url}: {e}");
            let _ = force_remove_dir_all(&target);
            let summary = e.to_string();
            Err(match e {
                CloneError::Failed { stderr } => {
                    ApiError::new(StatusCode::BAD_GATEWAY, "Git clone failed").with_details(stderr)
                }
                CloneError::TimedOut(_) => {
                    ApiError::new(StatusCode::GATEWAY_TIMEOUT, "Git clone timed out")
                        .with_details(summary)
                }
                CloneError::Spawn(_) => ApiError::internal("Git clone failed").with_details(summary),
            })
        }
    }
}

/// POST /upload-repo - Replace the repo directory with the contents of an
/// uploaded zip (multipart field `file`)
pub async fn upload_repo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request("Malformed upload").with_details(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = repo::sanitize_upload_name(field.file_name());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request("Failed to read upload").with_details(e.body_text()))?;
        upload = Some((file_name, bytes));
        break;
    }

    let Some((file_name, bytes)) = upload else {
        return Err(ApiError::bad_request("Missing multipart field 'file'"));
    };

    let _guard = state.workspace_lock.lock().await;

    let workspace = state.workspace.clone();
    let size = bytes.len();
    let extracted = tokio::task::spawn_blocking(move || -> anyhow::Result<usize> {
        workspace.clear_repo()?;
        let zip_path = workspace.repo_dir().join(&file_name);
        std::fs::write(&zip_path, &bytes)?;
        let result = repo::extract_zip(&zip_path, workspace.repo_dir());
        let _ = std::fs::remove_file(&zip_path);
        if result.is_err() {
            let _ = workspace.clear_repo();
        }
        result
    })
    .await
    .map_err(|e| ApiError::internal("Upload task failed").with_details(e.to_string()))?
    .map_err(|e| ApiError::bad_request("Failed to extract upload").with_details(format!("{e:#}")))?;

    tracing::info!("Uploaded archive ({size} bytes, {extracted} files) extracted");

    Ok(Json(MessageResponse {
        message: "repo uploaded and extracted".to_string(),
    }))
}

/// POST /reset - Delete the repo and its index
pub async fn reset(State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    let _guard = state.workspace_lock.lock().await;

    state.invalidate_index();
    state.workspace.reset().await.map_err(|e| {
        tracing::error!("Reset failed: {e:#}");
        ApiError::internal("Failed to fully reset").with_details(format!("{e:#}"))
    })?;

    tracing::info!("Workspace reset");
    Ok(Json(MessageResponse {
        message: "reset done".to_string(),
    }))
}

/// POST /index-repo - Build a fresh index from the current repo
pub async fn index_repo(State(state): State<AppState>) -> Result<Json<IndexResponse>, ApiError> {
    let _guard = state.workspace_lock.lock().await;

    let result = crate::rag::index_repo(
        &state.http_client,
        &state.config,
        state.workspace.repo_dir(),
        state.workspace.index_dir(),
    )
    .await;

    match result {
        Ok(index) => {
            let count = index.len();
            state.set_index(index);
            Ok(Json(IndexResponse {
                indexed_chunks: count,
            }))
        }
        Err(e) if e.downcast_ref::<NothingToIndex>().is_some() => {
            Err(ApiError::bad_request("Nothing to index").with_details(e.to_string()))
        }
        Err(e) => {
            // The cache may no longer match what is on disk.
            state.invalidate_index();
            tracing::error!("Indexing failed: {e:#}");
            Err(ApiError::internal("Indexing failed").with_details(format!("{e:#}")))
        }
    }
}
