use crate::{services::upload_store::StorageError, views};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

/// User-facing outcome of a failed request.
///
/// Every variant maps to a fixed redirect or page; the underlying cause is
/// logged where it happens and never reaches the client.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    /// No file supplied, empty filename, or the upload could not be stored.
    #[error("upload failed")]
    UploadFailed,

    /// Payload exceeded the configured maximum.
    #[error("upload exceeds {limit_bytes} bytes")]
    TooLarge { limit_bytes: u64 },

    /// An upload finished but its record could not be found afterwards.
    #[error("upload metadata missing")]
    MetadataMissing,

    /// No complete upload exists for the requested identifier.
    #[error("not found")]
    NotFound,

    /// Stored data is unreadable (e.g. a corrupt record).
    #[error("internal error")]
    Internal,
}

/// Failure reasons carried in the `/upload-failed` query string.
pub const REASON_TOO_LARGE: &str = "too_large";
pub const REASON_METADATA_MISSING: &str = "metadata_missing";

impl AppError {
    /// Location a redirecting variant sends the client to.
    pub fn redirect_target(&self) -> Option<String> {
        match self {
            AppError::UploadFailed => Some("/upload-failed".into()),
            AppError::TooLarge { .. } => Some(format!("/upload-failed?reason={REASON_TOO_LARGE}")),
            AppError::MetadataMissing => {
                Some(format!("/upload-failed?reason={REASON_METADATA_MISSING}"))
            }
            AppError::NotFound => Some("/not-found".into()),
            AppError::Internal => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.redirect_target() {
            Some(target) => Redirect::to(&target).into_response(),
            None => (StatusCode::INTERNAL_SERVER_ERROR, views::error_page()).into_response(),
        }
    }
}

/// Read-path mapping: missing uploads are NotFound, everything else is
/// logged and surfaced as a generic internal error.
impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => AppError::NotFound,
            other => {
                tracing::error!("storage error: {}", other);
                AppError::Internal
            }
        }
    }
}
