//! Dataset meta information under `/api/metadata`.

mod get;
mod search;

use actix_web::web::{get, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/metadata";

/// *   **`GET ?companyId=&dataType=&reportingPeriod=&showOnlyActive=`**: `search::process`.
/// *   **`GET /{data_id}`**: `get::process`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(search::process))
        .route("/{data_id}", get().to(get::process))
}
