//! # Data Point QA Service Module
//!
//! Review queue, status decisions and QA reports for single data points.

mod reports;
mod review;

use actix_web::web::{get, patch, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/qa/data-points";

/// Configures and returns the Actix `Scope` for the data point QA routes.
///
/// # Registered Routes:
///
/// *   **`GET ?companyId=&dataPointType=&reportingPeriod=&qaStatus=&chunkSize=&chunkIndex=`**:
///     `review::queue`. Defaults to the `Pending` queue. Reviewer role.
/// *   **`GET /{data_point_id}`**: `review::history`, newest first.
/// *   **`PATCH /{data_point_id}`**: `review::assign`. Reviewer role.
/// *   **`POST /{data_point_id}/reports`**: `reports::create`. Reviewer role.
/// *   **`GET /{data_point_id}/reports?showInactive=&reporterUserId=`**: `reports::list`.
/// *   **`GET /{data_point_id}/reports/{qa_report_id}`**: `reports::get`.
/// *   **`PATCH /{data_point_id}/reports/{qa_report_id}/status`**: `reports::set_status`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(review::queue))
        .route("/{data_point_id}/reports", post().to(reports::create))
        .route("/{data_point_id}/reports", get().to(reports::list))
        .route("/{data_point_id}/reports/{qa_report_id}", get().to(reports::get))
        .route(
            "/{data_point_id}/reports/{qa_report_id}/status",
            patch().to(reports::set_status),
        )
        .route("/{data_point_id}", get().to(review::history))
        .route("/{data_point_id}", patch().to(review::assign))
}
