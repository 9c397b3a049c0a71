//! Details page and raw download for a stored upload.
//! The payload is streamed from disk rather than buffered in memory.

use crate::{
    errors::AppError,
    handlers::{AppState, parse_file_id},
    views,
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, Response},
};
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

/// `GET /download/{file_id}`: metadata page with a download link.
pub async fn download_page(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let Some(file_id) = parse_file_id(&raw_id) else {
        debug!("download page requested for invalid id {:?}", raw_id);
        return Err(AppError::NotFound);
    };

    let record = state.store.get_record(file_id).await?;
    Ok(views::download_page(&record))
}

/// `GET /files/{file_id}`: stream the stored bytes as an attachment named
/// after the original upload.
pub async fn serve_file(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let Some(file_id) = parse_file_id(&raw_id) else {
        debug!("file requested for invalid id {:?}", raw_id);
        return Err(AppError::NotFound);
    };

    let (record, file) = state.store.open_blob(file_id).await?;
    let metadata = file.metadata().await.map_err(|err| {
        error!("failed to stat upload {}: {}", file_id, err);
        AppError::Internal
    })?;
    let content_type = mime_guess::from_path(&record.original_filename)
        .first_or_octet_stream()
        .to_string();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&record.original_filename),
        )
        .header(header::CONTENT_LENGTH, metadata.len())
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|err| {
            error!("failed to build download response for {}: {}", file_id, err);
            AppError::Internal
        })
}

/// `GET /not-found` and router fallback.
pub async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, views::not_found_page())
}

/// Build a `Content-Disposition: attachment` value for a client-supplied
/// filename.
///
/// Control characters are dropped and quotes/backslashes replaced in the
/// plain `filename` parameter; anything that is not plain ASCII is also sent
/// as an RFC 5987 `filename*` parameter.
pub fn content_disposition_header(filename: &str) -> String {
    let needs_encoding = !filename.is_ascii()
        || filename
            .chars()
            .any(|c| c.is_control() || c == '"' || c == '\\');
    if !needs_encoding {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let fallback: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            c => c,
        })
        .collect();
    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}
