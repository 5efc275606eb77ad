//! # Dataset Review Service Module
//!
//! Aggregate reviews of assembled datasets. Every route requires the reviewer role.

mod create;
mod get;
mod update;

use actix_web::web::{get, patch, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/qa/dataset-reviews";

/// Configures and returns the Actix `Scope` for the dataset review routes.
///
/// # Registered Routes:
///
/// *   **`POST /{dataset_id}`**: `create::process`. Starts a review of an assembled dataset.
/// *   **`GET /dataset/{dataset_id}`**: `get::by_dataset`. All reviews of a dataset.
/// *   **`GET /{dataset_review_id}`**: `get::process`.
/// *   **`PATCH /{dataset_review_id}/reviewer`**: `update::reviewer`. Takes over the review.
/// *   **`PATCH /{dataset_review_id}/review-state?reviewState=`**: `update::review_state`.
/// *   **`PATCH /{dataset_review_id}/accepted-source`**: `update::accepted_source`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/dataset/{dataset_id}", get().to(get::by_dataset))
        .route("/{dataset_review_id}/reviewer", patch().to(update::reviewer))
        .route("/{dataset_review_id}/review-state", patch().to(update::review_state))
        .route(
            "/{dataset_review_id}/accepted-source",
            patch().to(update::accepted_source),
        )
        .route("/{dataset_review_id}", get().to(get::process))
        .route("/{dataset_id}", post().to(create::process))
}
