use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::qa::dataset_review_service;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

/// Handler for `POST /qa/dataset-reviews/{dataset_id}`.
///
/// Fails with `409 Conflict` while another review of the dataset is still pending.
pub async fn process(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    dataset_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let review = state
        .transaction(|ctx| dataset_review_service::post_dataset_review(ctx, &dataset_id, &user))?;
    Ok(HttpResponse::Created().json(review))
}
