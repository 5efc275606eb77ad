//! # Dataset QA Service Module
//!
//! ## Sub-modules:
//! - `queue`: pending datasets and their count.
//! - `review`: review history and status decisions.
//! - `admin`: maintenance of the review log.
//! - `reports`: QA reports over whole datasets.

mod admin;
mod queue;
mod reports;
mod review;

use actix_web::web::{delete, get, patch, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/qa/datasets";

/// Configures and returns the Actix `Scope` for the dataset QA routes.
///
/// # Registered Routes:
///
/// *   **`GET ?dataTypes=&reportingPeriods=&companyName=&chunkSize=&chunkIndex=`**:
///     `queue::list`. Reviewer role.
/// *   **`GET /numberOfUnreviewedDatasets`**: `queue::count`. Reviewer role.
/// *   **`GET /currently-active/{company_id}/{framework}/{reporting_period}`**:
///     `review::currently_active`.
/// *   **`POST /{data_id}/reports`**, **`GET /{data_id}/reports`**,
///     **`GET /{data_id}/reports/{qa_report_id}`**,
///     **`PATCH /{data_id}/reports/{qa_report_id}/status`**: `reports`.
/// *   **`PATCH /{data_id}/uploader?uploaderUserId=`**: `admin::patch_uploader`. Admin role.
/// *   **`GET /{data_id}`**: `review::history`.
/// *   **`POST /{data_id}?qaStatus=&comment=`**: `review::assign`. Reviewer role.
/// *   **`DELETE /{data_id}`**: `admin::delete`. Admin role.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(queue::list))
        .route("/numberOfUnreviewedDatasets", get().to(queue::count))
        .route(
            "/currently-active/{company_id}/{framework}/{reporting_period}",
            get().to(review::currently_active),
        )
        .route("/{data_id}/reports", post().to(reports::create))
        .route("/{data_id}/reports", get().to(reports::list))
        .route("/{data_id}/reports/{qa_report_id}", get().to(reports::get))
        .route(
            "/{data_id}/reports/{qa_report_id}/status",
            patch().to(reports::set_status),
        )
        .route("/{data_id}/uploader", patch().to(admin::patch_uploader))
        .route("/{data_id}", get().to(review::history))
        .route("/{data_id}", post().to(review::assign))
        .route("/{data_id}", delete().to(admin::delete))
}
