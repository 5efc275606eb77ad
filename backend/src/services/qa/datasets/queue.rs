use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::qa::qa_review_manager;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::QaQueueQuery;

/// Pending datasets, oldest first.
pub async fn list(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<QaQueueQuery>,
) -> Result<HttpResponse, ApiError> {
    user.require(Role::Reviewer)?;
    let queue = state.read(|ctx| qa_review_manager::get_unreviewed_datasets(ctx, &query))?;
    Ok(HttpResponse::Ok().json(queue))
}

pub async fn count(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<QaQueueQuery>,
) -> Result<HttpResponse, ApiError> {
    user.require(Role::Reviewer)?;
    let pending = state.read(|ctx| qa_review_manager::number_of_pending_datasets(ctx, &query))?;
    Ok(HttpResponse::Ok().json(pending))
}
