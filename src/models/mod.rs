//! Core data models for the upload service.
//!
//! The only persisted entity is the per-upload metadata record; it
//! serializes naturally as JSON via `serde`.

pub mod upload;
