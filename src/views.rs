//! HTML pages served by the upload handlers.
//!
//! Pages are small enough to build with `format!`; every value that came
//! from a client (filename, MIME type) goes through [`html_escape`].

use crate::models::upload::UploadRecord;
use axum::response::Html;
use chrono::SecondsFormat;

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"en\">\n",
            "<head><meta charset=\"utf-8\"><title>{title} - filesync</title></head>\n",
            "<body>\n",
            "<nav><a href=\"/\">Home</a> | <a href=\"/upload\">Upload</a></nav>\n",
            "<main>\n<h1>{title}</h1>\n{body}\n</main>\n",
            "</body>\n</html>\n"
        ),
        title = html_escape(title),
        body = body
    ))
}

pub fn index_page() -> Html<String> {
    layout(
        "filesync",
        "<p>Share a file: upload it and pass the download link along.</p>\n\
         <p><a href=\"/upload\">Upload a file</a></p>",
    )
}

pub fn upload_page(max_upload_bytes: u64) -> Html<String> {
    let body = format!(
        concat!(
            "<form action=\"/upload\" method=\"post\" enctype=\"multipart/form-data\">\n",
            "<input type=\"file\" name=\"file\" required>\n",
            "<button type=\"submit\">Upload</button>\n",
            "</form>\n",
            "<p>Maximum size: {}</p>"
        ),
        format_size(max_upload_bytes)
    );
    layout("Upload a file", &body)
}

pub fn upload_success_page(record: &UploadRecord) -> Html<String> {
    let body = format!(
        "{}\n<p><a href=\"/download/{}\">Download page</a></p>",
        record_table(record),
        record.file_id
    );
    layout("Upload complete", &body)
}

pub fn upload_failed_page(message: Option<&str>) -> Html<String> {
    let detail = message
        .map(|m| format!("<p class=\"error\">{}</p>\n", html_escape(m)))
        .unwrap_or_default();
    let body = format!("{detail}<p><a href=\"/upload\">Try again</a></p>");
    layout("Upload failed", &body)
}

pub fn download_page(record: &UploadRecord) -> Html<String> {
    let body = format!(
        "{}\n<p><a href=\"/files/{}\" download>Download {}</a></p>",
        record_table(record),
        record.file_id,
        html_escape(&record.original_filename)
    );
    layout("Download", &body)
}

pub fn not_found_page() -> Html<String> {
    layout(
        "Not found",
        "<p>The requested file does not exist.</p>\n<p><a href=\"/\">Back to start</a></p>",
    )
}

pub fn error_page() -> Html<String> {
    layout(
        "Something went wrong",
        "<p>The file could not be read. Please try again later.</p>",
    )
}

fn record_table(record: &UploadRecord) -> String {
    let extension = if record.extension.is_empty() {
        "(none)"
    } else {
        record.extension.as_str()
    };
    let rows = [
        ("File ID", record.file_id.to_string()),
        ("Filename", record.original_filename.clone()),
        ("Extension", extension.to_string()),
        ("MIME type", record.mime_type.clone()),
        ("Size", format_size(record.size)),
        ("SHA-256", record.sha256.clone()),
        (
            "Uploaded at",
            record
                .uploaded_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
    ];

    let mut table = String::from("<table>\n");
    for (label, value) in rows {
        table.push_str(&format!(
            "<tr><th>{}</th><td>{}</td></tr>\n",
            label,
            html_escape(&value)
        ));
    }
    table.push_str("</table>");
    table
}

/// Human-readable size: bytes below 1 KB, otherwise one decimal place.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

pub fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
