//! # Dataset Service Module
//!
//! Upload and retrieval of framework datasets under `/api/data`.
//!
//! ## Sub-modules:
//! - `store`: validates an upload and stores it, split into data points when the framework has a
//!   specification.
//! - `get`: assembles a dataset back into its framework document.
//! - `export`: the assembled document as a JSON or CSV download.
//! - `data_points`: the data point ids a dataset was split into.

mod data_points;
mod export;
mod get;
mod store;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/data";

/// Configures and returns the Actix `Scope` for all dataset routes.
///
/// # Registered Routes:
///
/// *   **`POST /{data_type}?bypassQa=`**: `store::process`. Uploader role; bypassing QA also
///     needs the reviewer role.
/// *   **`GET /{data_id}/data-points`**: `data_points::process`.
/// *   **`GET /{data_type}/{data_id}/export?format=`**: `export::process`.
/// *   **`GET /{data_type}/{data_id}`**: `get::process`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/{data_type}", post().to(store::process))
        .route("/{data_id}/data-points", get().to(data_points::process))
        .route("/{data_type}/{data_id}/export", get().to(export::process))
        .route("/{data_type}/{data_id}", get().to(get::process))
}
