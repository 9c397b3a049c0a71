//! Upload form, upload submission and the success/failure pages it
//! redirects to.

use crate::{
    errors::{AppError, REASON_METADATA_MISSING, REASON_TOO_LARGE},
    handlers::{AppState, parse_file_id},
    models::upload::UploadRecord,
    services::upload_store::StorageError,
    views,
};
use axum::{
    extract::{
        Multipart, Query, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::{Html, Redirect},
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

/// Recorded when the client sends no content type for the file part.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct UploadSuccessQuery {
    pub file_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadFailedQuery {
    pub reason: Option<String>,
}

/// The `file` part of an upload form.
struct FilePart {
    filename: String,
    mime_type: String,
    bytes: Bytes,
}

/// `GET /`
pub async fn index() -> Html<String> {
    views::index_page()
}

/// `GET /upload`
pub async fn upload_page(State(state): State<AppState>) -> Html<String> {
    views::upload_page(state.max_upload_bytes)
}

/// `POST /upload`
///
/// Reads the `file` part, rejects missing/unnamed files and oversized
/// payloads, then stores the bytes under a fresh UUID and redirects to the
/// success page.
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Redirect, AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!("upload rejected: {}", rejection);
        AppError::UploadFailed
    })?;

    let Some(part) = read_file_part(&mut multipart, state.max_upload_bytes).await? else {
        debug!("upload rejected: no `{}` field", FILE_FIELD);
        return Err(AppError::UploadFailed);
    };
    if part.filename.is_empty() {
        debug!("upload rejected: empty filename");
        return Err(AppError::UploadFailed);
    }

    let file_id = Uuid::new_v4();
    let record = UploadRecord::build(&part.bytes, &part.filename, &part.mime_type, file_id);

    state.store.put(&record, &part.bytes).await.map_err(|err| {
        error!("failed to store upload {}: {}", file_id, err);
        AppError::UploadFailed
    })?;

    info!(
        "stored upload {} ({:?}, {} bytes, sha256 {})",
        file_id, record.original_filename, record.size, record.sha256
    );
    Ok(Redirect::to(&format!("/upload-success?file_id={}", file_id)))
}

/// Pull the first `file` part out of the form, skipping any other fields.
async fn read_file_part(
    multipart: &mut Multipart,
    limit_bytes: u64,
) -> Result<Option<FilePart>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| multipart_error(err, limit_bytes))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let mime_type = field
            .content_type()
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| multipart_error(err, limit_bytes))?;

        if bytes.len() as u64 > limit_bytes {
            warn!(
                "upload rejected: {} bytes exceeds limit of {}",
                bytes.len(),
                limit_bytes
            );
            return Err(AppError::TooLarge { limit_bytes });
        }

        return Ok(Some(FilePart {
            filename,
            mime_type,
            bytes,
        }));
    }

    Ok(None)
}

fn multipart_error(err: MultipartError, limit_bytes: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("upload rejected: request body exceeds limit of {} bytes", limit_bytes);
        AppError::TooLarge { limit_bytes }
    } else {
        debug!("upload rejected: malformed multipart body: {}", err);
        AppError::UploadFailed
    }
}

/// `GET /upload-success?file_id=`
pub async fn upload_success(
    State(state): State<AppState>,
    Query(query): Query<UploadSuccessQuery>,
) -> Result<Html<String>, AppError> {
    let file_id = query
        .file_id
        .as_deref()
        .and_then(parse_file_id)
        .ok_or(AppError::MetadataMissing)?;

    match state.store.get_record(file_id).await {
        Ok(record) => Ok(views::upload_success_page(&record)),
        Err(StorageError::NotFound(_)) => Err(AppError::MetadataMissing),
        Err(err) => Err(err.into()),
    }
}

/// `GET /upload-failed?reason=`
pub async fn upload_failed(
    State(state): State<AppState>,
    Query(query): Query<UploadFailedQuery>,
) -> Html<String> {
    let message = match query.reason.as_deref() {
        Some(REASON_TOO_LARGE) => Some(too_large_message(state.max_upload_bytes)),
        Some(REASON_METADATA_MISSING) => Some("Upload metadata missing.".to_string()),
        _ => None,
    };
    views::upload_failed_page(message.as_deref())
}

/// Fixed message shown when an upload exceeds `limit_bytes`.
pub fn too_large_message(limit_bytes: u64) -> String {
    let limit = if limit_bytes >= MIB && limit_bytes % MIB == 0 {
        format!("{} MB", limit_bytes / MIB)
    } else {
        views::format_size(limit_bytes)
    };
    format!("File too large. Maximum size is {}.", limit)
}
