//! Test helpers shared by the HTTP integration tests.

#![allow(dead_code)]

use axum::http::{StatusCode, header::LOCATION};
use axum_test::{
    TestResponse, TestServer,
    multipart::{MultipartForm, Part},
};
use filesync::{handlers::AppState, routes::routes::routes, services::upload_store::UploadStore};
use std::path::PathBuf;
use tempfile::TempDir;
use uuid::Uuid;

pub const SUCCESS_PREFIX: &str = "/upload-success?file_id=";

/// A server over a throwaway storage directory.
pub struct TestApp {
    pub server: TestServer,
    pub store: UploadStore,
    _tmp: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_limit(filesync::config::DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn with_limit(max_upload_bytes: u64) -> Self {
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");
        let store = UploadStore::new(tmp.path().join("uploads"));
        let state = AppState::new(store.clone(), max_upload_bytes);
        let server = TestServer::new(routes(state)).expect("Failed to create test server");

        Self {
            server,
            store,
            _tmp: tmp,
        }
    }

    pub fn storage_root(&self) -> PathBuf {
        self.store.base_path.clone()
    }

    /// Number of upload directories currently on disk.
    pub fn stored_uploads(&self) -> usize {
        match std::fs::read_dir(self.storage_root()) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    /// POST a single file part named `file`.
    pub async fn upload(&self, filename: &str, mime_type: &str, content: &[u8]) -> TestResponse {
        let part = Part::bytes(content.to_vec())
            .file_name(filename)
            .mime_type(mime_type);
        self.server
            .post("/upload")
            .multipart(MultipartForm::new().add_part("file", part))
            .await
    }

    /// Upload and return the new identifier, asserting the success redirect.
    pub async fn upload_ok(&self, filename: &str, mime_type: &str, content: &[u8]) -> Uuid {
        let response = self.upload(filename, mime_type, content).await;
        let location = location(&response);
        let id = location
            .strip_prefix(SUCCESS_PREFIX)
            .unwrap_or_else(|| panic!("unexpected redirect {location}"));
        Uuid::parse_str(id).expect("redirect should carry a UUID")
    }
}

/// The `Location` header of a redirect response.
pub fn location(response: &TestResponse) -> String {
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    response
        .header(LOCATION)
        .to_str()
        .expect("Location should be ASCII")
        .to_string()
}
