//! Defines the routes of the upload service.
//!
//! ## Structure
//! - **Pages**
//!   - `GET  /`                     landing page
//!   - `GET  /upload`               upload form
//!   - `GET  /upload-success`       details of a finished upload (`?file_id=`)
//!   - `GET  /upload-failed`        failure page (`?reason=`)
//!   - `GET  /download/{file_id}`   details page with download link
//!   - `GET  /not-found`            404 page, also the fallback
//!
//! - **Data**
//!   - `POST /upload`               multipart upload, field `file`
//!   - `GET  /files/{file_id}`      raw bytes as an attachment
//!
//! - **Probes**
//!   - `GET  /healthz`, `GET /readyz`

use crate::handlers::{
    AppState,
    download_handlers::{download_page, not_found, serve_file},
    health_handlers::{healthz, readyz},
    upload_handlers::{index, upload_failed, upload_file, upload_page, upload_success},
};
use axum::{Router, extract::DefaultBodyLimit, routing::get};

/// Allowance on top of the file limit for multipart boundaries, part
/// headers and other form fields.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the router for every page and endpoint, bound to `state`.
///
/// Request bodies are capped at the upload limit plus
/// [`MULTIPART_OVERHEAD_BYTES`]; the upload handler enforces the exact
/// per-file limit itself.
pub fn routes(state: AppState) -> Router {
    let body_limit = usize::try_from(state.max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // pages
        .route("/", get(index))
        .route("/upload", get(upload_page).post(upload_file))
        .route("/upload-success", get(upload_success))
        .route("/upload-failed", get(upload_failed))
        .route("/download/{file_id}", get(download_page))
        .route("/files/{file_id}", get(serve_file))
        .route("/not-found", get(not_found))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
