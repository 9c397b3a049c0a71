//! filesync: a minimal file upload/download web service.
//!
//! Uploads are stored on disk as `<root>/<file_id>/data` plus a JSON
//! metadata record in `<root>/<file_id>/info.json`.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod views;
