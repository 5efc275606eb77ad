use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::qa::dataset_review_service;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

pub async fn process(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    dataset_review_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    user.require(Role::Reviewer)?;
    let review =
        state.read(|ctx| dataset_review_service::get_dataset_review(ctx, &dataset_review_id))?;
    Ok(HttpResponse::Ok().json(review))
}

pub async fn by_dataset(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    dataset_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    user.require(Role::Reviewer)?;
    let reviews = state
        .read(|ctx| dataset_review_service::get_dataset_reviews_by_dataset_id(ctx, &dataset_id))?;
    Ok(HttpResponse::Ok().json(reviews))
}
