//! Upload processing endpoint.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use super::super::AppState;
use crate::services::{ProcessError, UploadRequest};

/// Successful processing response.
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub preview: String,
    pub download_url: String,
    pub filename: String,
}

/// Accept a multipart upload (`file`, `lang`, `format`) and convert it.
pub async fn process_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>, ProcessError> {
    let limit = state.settings.max_upload_bytes;
    let request = read_upload(&mut multipart, limit).await?;

    let service = state.service.clone();
    let conversion = tokio::task::spawn_blocking(move || service.convert_upload(request))
        .await
        .map_err(|e| ProcessError::Internal(format!("conversion task failed: {}", e)))??;

    let filename = conversion.artifact.filename.clone();
    Ok(Json(ProcessResponse {
        success: true,
        preview: conversion.preview(state.settings.preview_chars),
        download_url: format!("/download/{}", urlencoding::encode(&filename)),
        filename,
    }))
}

/// Collect the form fields we care about; unknown fields are skipped.
async fn read_upload(
    multipart: &mut Multipart,
    limit: usize,
) -> Result<UploadRequest, ProcessError> {
    let mut request = UploadRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        match field.name().unwrap_or("") {
            "file" => {
                let Some(filename) = field.file_name().map(|s| s.to_string()) else {
                    continue;
                };
                let data = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
                if data.len() > limit {
                    return Err(ProcessError::TooLarge(limit));
                }
                tracing::debug!("Received file '{}' ({} bytes)", filename, data.len());
                request.filename = Some(filename);
                request.content = data.to_vec();
            }
            "lang" => {
                request.language = Some(field.text().await.map_err(|e| multipart_error(e, limit))?)
            }
            "format" => {
                request.format = Some(field.text().await.map_err(|e| multipart_error(e, limit))?)
            }
            _ => {}
        }
    }

    Ok(request)
}

fn multipart_error(err: MultipartError, limit: usize) -> ProcessError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ProcessError::TooLarge(limit)
    } else {
        ProcessError::MalformedUpload(err.body_text())
    }
}
