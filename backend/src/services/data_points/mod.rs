//! # Data Point Service Module
//!
//! Single data points under `/api/data-points`.
//!
//! ## Sub-modules:
//! - `upload`: validates and stores one data point.
//! - `get`: content of a data point.
//! - `metadata`: meta information of a data point.
//! - `search`: meta information filtered by company, type, period and status.

mod get;
mod metadata;
mod search;
mod upload;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/data-points";

/// *   **`POST ?bypassQa=`**: `upload::process`. Uploader role.
/// *   **`GET ?companyId=&dataPointType=&reportingPeriod=&qaStatus=&showOnlyActive=`**:
///     `search::process`.
/// *   **`GET /{data_point_id}/metadata`**: `metadata::process`.
/// *   **`GET /{data_point_id}`**: `get::process`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(upload::process))
        .route("", get().to(search::process))
        .route("/{data_point_id}/metadata", get().to(metadata::process))
        .route("/{data_point_id}", get().to(get::process))
}
