//! Artifact download endpoint.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use super::super::error::json_error;
use super::super::AppState;
use crate::storage::resolve_artifact;

/// Serve a previously produced artifact as an attachment.
pub async fn download_artifact(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    let Some(path) = resolve_artifact(&state.settings.outputs_dir, &filename) else {
        return json_error(StatusCode::NOT_FOUND, "File not found");
    };

    let content = match tokio::fs::read(&path).await {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to read artifact {}: {}", path.display(), e);
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read file");
        }
    };

    let mime = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .to_string();
    let disposition = format!("attachment; filename=\"{}\"", filename);

    (
        [
            (header::CONTENT_TYPE, mime),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content,
    )
        .into_response()
}
