//! HTTP handlers for the upload service, plus the state they share.

pub mod download_handlers;
pub mod health_handlers;
pub mod upload_handlers;

use crate::{config::AppConfig, services::upload_store::UploadStore};
use uuid::Uuid;

/// State handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Where uploads and their records live.
    pub store: UploadStore,

    /// Largest accepted file, in bytes.
    pub max_upload_bytes: u64,
}

impl AppState {
    pub fn new(store: UploadStore, max_upload_bytes: u64) -> Self {
        Self {
            store,
            max_upload_bytes,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(UploadStore::new(&cfg.storage_dir), cfg.max_upload_bytes)
    }
}

/// Parse an identifier taken from a URL. Anything that is not a UUID cannot
/// name an upload, so callers treat `None` as not-found.
pub(crate) fn parse_file_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}
