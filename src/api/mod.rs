//! Axum HTTP handlers and the router that wires them up.

pub mod ask;
pub mod repos;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::models::{ErrorBody, HealthResponse};
use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_mb.saturating_mul(1024 * 1024);

    Router::new()
        .route("/", get(health))
        .route("/load-github", post(repos::load_github))
        .route("/upload-repo", post(repos::upload_repo))
        .route("/reset", post(repos::reset))
        .route("/index-repo", post(repos::index_repo))
        .route("/ask", post(ask::ask))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        // The browser frontend is served from a different origin.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// An error response rendered as `{"error": ..., "details": ...}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                details: None,
            },
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.body.details = Some(details.into());
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_builders() {
        let err = ApiError::bad_request("nope").with_details("why");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.error, "nope");
        assert_eq!(err.body.details.as_deref(), Some("why"));
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body.status, "ok");
    }
}
