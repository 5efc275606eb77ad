//! # Document Service Module
//!
//! Stores uploaded source documents. The file reference of a document is the MD5 hex digest of
//! its content, so uploading the same file twice yields the same reference.

mod download;
mod upload;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/documents";

/// # Registered Routes:
///
/// *   **`POST`**: `upload::process`. Multipart form with a `file` part. Uploader role.
/// *   **`GET /{file_reference}/exists`**: `download::exists`.
/// *   **`GET /{file_reference}`**: `download::process`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(upload::process))
        .route("/{file_reference}/exists", get().to(download::exists))
        .route("/{file_reference}", get().to(download::process))
}
