//! Upload flow tests: form submission, validation, size limits and the
//! pages the submission redirects to.

mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use common::{SUCCESS_PREFIX, TestApp, location};
use filesync::models::upload::sha256_hex;

#[tokio::test]
async fn test_upload_page_renders_form() {
    let app = TestApp::new();

    let response = app.server.get("/upload").await;

    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("enctype=\"multipart/form-data\""));
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("50.0 MB"));
}

#[tokio::test]
async fn test_index_links_to_upload() {
    let app = TestApp::new();

    let response = app.server.get("/").await;

    response.assert_status_ok();
    assert!(response.text().contains("href=\"/upload\""));
}

#[tokio::test]
async fn test_upload_redirects_to_success_page() {
    let app = TestApp::new();
    let content = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n";

    let response = app.upload("Report.PDF", "application/pdf", content).await;
    let target = location(&response);
    assert!(target.starts_with(SUCCESS_PREFIX));

    let page = app.server.get(&target).await;
    page.assert_status_ok();
    let body = page.text();
    assert!(body.contains("Report.PDF"));
    assert!(body.contains(".pdf"));
    assert!(body.contains(&sha256_hex(content)));
}

#[tokio::test]
async fn test_upload_persists_record_from_received_bytes() {
    let app = TestApp::new();
    let content = b"%PDF-1.4 body";

    let id = app.upload_ok("Report.PDF", "application/pdf", content).await;

    let record = app.store.get_record(id).await.unwrap();
    assert_eq!(record.file_id, id);
    assert_eq!(record.original_filename, "Report.PDF");
    assert_eq!(record.extension, ".pdf");
    assert_eq!(record.mime_type, "application/pdf");
    assert_eq!(record.sha256, sha256_hex(content));
    assert_eq!(record.size, content.len() as u64);

    let dir = app.storage_root().join(id.to_string());
    assert_eq!(std::fs::read(dir.join("data")).unwrap(), content);
    assert!(dir.join("info.json").is_file());
}

#[tokio::test]
async fn test_zero_byte_upload_succeeds() {
    let app = TestApp::new();

    let id = app.upload_ok("empty.txt", "text/plain", b"").await;

    let record = app.store.get_record(id).await.unwrap();
    assert_eq!(record.size, 0);
    assert_eq!(
        record.sha256,
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[tokio::test]
async fn test_identical_uploads_get_distinct_ids() {
    let app = TestApp::new();

    let first = app.upload_ok("same.txt", "text/plain", b"same bytes").await;
    let second = app.upload_ok("same.txt", "text/plain", b"same bytes").await;

    assert_ne!(first, second);
    assert_eq!(app.stored_uploads(), 2);
    let a = app.store.get_blob(first).await.unwrap();
    let b = app.store.get_blob(second).await.unwrap();
    assert_eq!(a.bytes, b.bytes);
}

#[tokio::test]
async fn test_missing_file_field_fails() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/upload")
        .multipart(MultipartForm::new().add_text("comment", "no file here"))
        .await;

    assert_eq!(location(&response), "/upload-failed");
    assert_eq!(app.stored_uploads(), 0);
}

#[tokio::test]
async fn test_file_without_name_fails() {
    let app = TestApp::new();
    let part = Part::bytes(b"anonymous".to_vec()).mime_type("text/plain");

    let response = app
        .server
        .post("/upload")
        .multipart(MultipartForm::new().add_part("file", part))
        .await;

    assert_eq!(location(&response), "/upload-failed");
    assert_eq!(app.stored_uploads(), 0);
}

#[tokio::test]
async fn test_non_multipart_body_fails() {
    let app = TestApp::new();

    let response = app.server.post("/upload").text("just text").await;

    assert_eq!(location(&response), "/upload-failed");
}

#[tokio::test]
async fn test_other_fields_are_ignored() {
    let app = TestApp::new();
    let form = MultipartForm::new()
        .add_text("comment", "ignored")
        .add_part(
            "file",
            Part::bytes(b"payload".to_vec())
                .file_name("notes.md")
                .mime_type("text/markdown"),
        );

    let response = app.server.post("/upload").multipart(form).await;

    assert!(location(&response).starts_with(SUCCESS_PREFIX));
    assert_eq!(app.stored_uploads(), 1);
}

#[tokio::test]
async fn test_file_over_limit_is_rejected_without_persisting() {
    let app = TestApp::with_limit(16);

    let response = app.upload("big.bin", "application/octet-stream", &[7u8; 17]).await;

    assert_eq!(location(&response), "/upload-failed?reason=too_large");
    assert_eq!(app.stored_uploads(), 0);
}

#[tokio::test]
async fn test_body_over_request_limit_is_too_large() {
    let app = TestApp::with_limit(16);
    let content = vec![1u8; 256 * 1024];

    let response = app.upload("huge.bin", "application/octet-stream", &content).await;

    assert_eq!(location(&response), "/upload-failed?reason=too_large");
    assert_eq!(app.stored_uploads(), 0);
}

#[tokio::test]
async fn test_file_at_limit_is_accepted() {
    let app = TestApp::with_limit(16);

    let id = app.upload_ok("exact.bin", "application/octet-stream", &[0u8; 16]).await;

    assert_eq!(app.store.get_record(id).await.unwrap().size, 16);
}

#[tokio::test]
async fn test_too_large_page_shows_limit() {
    let app = TestApp::new();

    let response = app.server.get("/upload-failed?reason=too_large").await;

    response.assert_status_ok();
    assert!(
        response
            .text()
            .contains("File too large. Maximum size is 50 MB.")
    );
}

#[tokio::test]
async fn test_failed_page_ignores_unknown_reason() {
    let app = TestApp::new();

    let response = app
        .server
        .get("/upload-failed?reason=%3Cscript%3Ealert(1)%3C/script%3E")
        .await;

    response.assert_status_ok();
    let body = response.text();
    assert!(!body.contains("<script>"));
    assert!(!body.contains("class=\"error\""));
}

#[tokio::test]
async fn test_success_page_without_record_redirects_to_failure() {
    let app = TestApp::new();
    let unknown = uuid::Uuid::new_v4();

    let response = app
        .server
        .get(&format!("{SUCCESS_PREFIX}{unknown}"))
        .await;
    assert_eq!(
        location(&response),
        "/upload-failed?reason=metadata_missing"
    );

    let missing = app.server.get("/upload-success").await;
    assert_eq!(
        location(&missing),
        "/upload-failed?reason=metadata_missing"
    );

    let page = app
        .server
        .get("/upload-failed?reason=metadata_missing")
        .await;
    assert_eq!(page.status_code(), StatusCode::OK);
    assert!(page.text().contains("Upload metadata missing."));
}
