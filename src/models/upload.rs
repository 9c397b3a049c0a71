//! Represents the metadata record stored next to every uploaded file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Metadata describing a single stored upload.
///
/// Persisted as `info.json` beside the raw bytes. Hash and size always come
/// from the stored bytes; filename and MIME type are whatever the client sent
/// and are only ever used for display and as the download name.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UploadRecord {
    /// Identifier assigned at upload time; also names the storage directory.
    pub file_id: Uuid,

    /// Filename as supplied by the client.
    pub original_filename: String,

    /// Lower-cased extension of `original_filename`, including the dot.
    pub extension: String,

    /// Content type reported by the client (advisory only).
    pub mime_type: String,

    /// Lower-case hex SHA-256 of the stored bytes.
    pub sha256: String,

    /// Size in bytes.
    pub size: u64,

    /// When the record was built.
    pub uploaded_at: DateTime<Utc>,
}

impl UploadRecord {
    /// Build the record for `raw_bytes`, stamped with the current UTC time.
    pub fn build(
        raw_bytes: &[u8],
        original_filename: &str,
        mime_type: &str,
        file_id: Uuid,
    ) -> Self {
        Self {
            file_id,
            original_filename: original_filename.to_string(),
            extension: file_extension(original_filename),
            mime_type: mime_type.to_string(),
            sha256: sha256_hex(raw_bytes),
            size: raw_bytes.len() as u64,
            uploaded_at: Utc::now(),
        }
    }
}

/// Lower-case hex SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Extract the lower-cased extension (with its leading dot) from a filename.
///
/// Only the last path component is considered, and leading dots of that
/// component never start an extension, so `.bashrc` has none.
pub fn file_extension(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    match base.rfind('.') {
        Some(dot) if base[..dot].chars().any(|c| c != '.') => base[dot..].to_lowercase(),
        _ => String::new(),
    }
}
