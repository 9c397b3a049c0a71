//! src/services/upload_store.rs
//!
//! UploadStore: persists every upload as two files beneath
//! `base_path/{file_id}/`: the raw payload (`data`) and its metadata record
//! (`info.json`). The record is written last, and its presence is what makes
//! an upload visible to readers. There is no index, listing or deletion.

use crate::models::upload::UploadRecord;
use bytes::Bytes;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::debug;
use uuid::Uuid;

/// Name of the payload artifact inside an upload directory.
pub const BLOB_FILE: &str = "data";

/// Name of the metadata artifact inside an upload directory.
pub const RECORD_FILE: &str = "info.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload `{0}` not found")]
    NotFound(Uuid),
    #[error("upload `{0}` already exists")]
    AlreadyExists(Uuid),
    #[error("metadata for upload `{file_id}` is corrupt: {source}")]
    CorruptRecord {
        file_id: Uuid,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode metadata: {0}")]
    Encode(#[source] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Raw payload of an upload together with the name it should be saved as.
#[derive(Debug, Clone)]
pub struct Blob {
    pub bytes: Bytes,
    pub suggested_filename: String,
}

/// Filesystem-backed store for uploads and their metadata records.
///
/// Every path is derived from the upload's `Uuid`; client-supplied filenames
/// never reach the filesystem. The store itself enforces no size limit.
#[derive(Clone, Debug)]
pub struct UploadStore {
    /// Root directory holding one sub-directory per upload.
    pub base_path: PathBuf,
}

impl UploadStore {
    /// Create a store rooted at `base_path`. The directory is created lazily
    /// on the first `put`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn upload_dir(&self, file_id: Uuid) -> PathBuf {
        self.base_path.join(file_id.to_string())
    }

    fn blob_path(&self, file_id: Uuid) -> PathBuf {
        self.upload_dir(file_id).join(BLOB_FILE)
    }

    fn record_path(&self, file_id: Uuid) -> PathBuf {
        self.upload_dir(file_id).join(RECORD_FILE)
    }

    /// Persist `raw_bytes` and `record` under `record.file_id`.
    ///
    /// - Creates the root directory if needed, then a fresh directory for
    ///   the upload. An existing directory is never reused.
    /// - Writes the payload, then the record, each via temp file + rename.
    /// - Removes the upload directory again if either write fails.
    pub async fn put(&self, record: &UploadRecord, raw_bytes: &[u8]) -> StorageResult<()> {
        let file_id = record.file_id;
        fs::create_dir_all(&self.base_path).await?;

        let dir = self.upload_dir(file_id);
        fs::create_dir(&dir).await.map_err(|err| {
            if err.kind() == ErrorKind::AlreadyExists {
                StorageError::AlreadyExists(file_id)
            } else {
                StorageError::Io(err)
            }
        })?;

        match write_artifacts(&dir, record, raw_bytes).await {
            Ok(()) => {
                debug!("stored upload {} ({} bytes)", file_id, raw_bytes.len());
                Ok(())
            }
            Err(err) => {
                if let Err(cleanup_err) = fs::remove_dir_all(&dir).await {
                    debug!(
                        "failed to remove partial upload {}: {}",
                        dir.display(),
                        cleanup_err
                    );
                }
                Err(err)
            }
        }
    }

    /// Load the metadata record for `file_id`.
    ///
    /// Returns NotFound when no record exists and CorruptRecord when it exists
    /// but cannot be parsed.
    pub async fn get_record(&self, file_id: Uuid) -> StorageResult<UploadRecord> {
        let raw = fs::read(self.record_path(file_id))
            .await
            .map_err(|err| not_found_or_io(err, file_id))?;

        serde_json::from_slice(&raw)
            .map_err(|source| StorageError::CorruptRecord { file_id, source })
    }

    /// Open an upload for streaming out.
    ///
    /// The record gates visibility: a payload without a record is NotFound,
    /// and so is a record whose payload has gone missing.
    pub async fn open_blob(&self, file_id: Uuid) -> StorageResult<(UploadRecord, File)> {
        let record = self.get_record(file_id).await?;
        let file = File::open(self.blob_path(file_id))
            .await
            .map_err(|err| not_found_or_io(err, file_id))?;

        Ok((record, file))
    }

    /// Read an upload fully into memory.
    pub async fn get_blob(&self, file_id: Uuid) -> StorageResult<Blob> {
        let (record, mut file) = self.open_blob(file_id).await?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).await?;

        Ok(Blob {
            bytes: Bytes::from(bytes),
            suggested_filename: record.original_filename,
        })
    }
}

async fn write_artifacts(dir: &Path, record: &UploadRecord, raw_bytes: &[u8]) -> StorageResult<()> {
    let encoded = serde_json::to_vec_pretty(record).map_err(StorageError::Encode)?;
    write_atomic(&dir.join(BLOB_FILE), raw_bytes).await?;
    write_atomic(&dir.join(RECORD_FILE), &encoded).await?;
    Ok(())
}

/// Write `contents` to a temp file next to `path`, fsync it and rename it
/// into place. The temp file is removed on failure.
async fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::other("artifact path missing parent directory"))?;
    let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));

    let result = async {
        let mut file = File::create(&tmp_path).await?;
        file.write_all(contents).await?;
        file.flush().await?;
        file.sync_all().await?;
        fs::rename(&tmp_path, path).await
    }
    .await;

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path).await;
    }
    result
}

fn not_found_or_io(err: io::Error, file_id: Uuid) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        StorageError::NotFound(file_id)
    } else {
        StorageError::Io(err)
    }
}
