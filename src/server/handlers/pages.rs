//! HTML pages and health check.

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use super::super::template_structs::{IndexTemplate, SelectOption};
use super::super::AppState;
use crate::export::ExportFormat;
use crate::ocr::OcrLanguage;

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Upload page.
pub async fn index(State(state): State<AppState>) -> Response {
    let settings = &state.settings;

    let languages: Vec<SelectOption> = OcrLanguage::all()
        .iter()
        .map(|lang| SelectOption {
            value: lang.as_str(),
            label: lang.display_name(),
            selected: *lang == settings.default_language,
        })
        .collect();

    let formats: Vec<SelectOption> = ExportFormat::all()
        .iter()
        .map(|format| SelectOption {
            value: format.as_str(),
            label: format.display_name(),
            selected: *format == settings.default_format,
        })
        .collect();

    let accept = settings
        .allowed_extensions
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",");

    let template = IndexTemplate {
        languages,
        formats,
        accept,
        max_upload_mb: settings.max_upload_bytes / (1024 * 1024),
    };

    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render index: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}
