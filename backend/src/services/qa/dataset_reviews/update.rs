use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::qa::dataset_review_service;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::{AcceptedSourcePatch, ReviewStateQuery};

pub async fn reviewer(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    dataset_review_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let review = state
        .transaction(|ctx| dataset_review_service::set_reviewer(ctx, &dataset_review_id, &user))?;
    Ok(HttpResponse::Ok().json(review))
}

pub async fn review_state(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    dataset_review_id: web::Path<String>,
    query: web::Query<ReviewStateQuery>,
) -> Result<HttpResponse, ApiError> {
    user.require(Role::Reviewer)?;
    let review = state.transaction(|ctx| {
        dataset_review_service::set_review_state(ctx, &dataset_review_id, query.review_state, &user)
    })?;
    Ok(HttpResponse::Ok().json(review))
}

/// Records which source the reviewer accepted for one data point type of the dataset.
pub async fn accepted_source(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    dataset_review_id: web::Path<String>,
    body: web::Json<AcceptedSourcePatch>,
) -> Result<HttpResponse, ApiError> {
    user.require(Role::Reviewer)?;
    let review = state.transaction(|ctx| {
        dataset_review_service::set_accepted_source(ctx, &dataset_review_id, &body, &user)
    })?;
    Ok(HttpResponse::Ok().json(review))
}
