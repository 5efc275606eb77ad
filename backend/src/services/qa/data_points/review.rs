use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::qa::data_point_qa_review_manager;
use crate::services::correlation_id;
use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use common::requests::{DataPointQaQueueQuery, DataPointQaStatusPatch};

pub async fn queue(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<DataPointQaQueueQuery>,
) -> Result<HttpResponse, ApiError> {
    user.require(Role::Reviewer)?;
    let queue =
        state.read(|ctx| data_point_qa_review_manager::get_data_point_qa_review_queue(ctx, &query))?;
    Ok(HttpResponse::Ok().json(queue))
}

pub async fn history(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    data_point_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let history = state.read(|ctx| {
        data_point_qa_review_manager::get_data_point_qa_review_history(ctx, &data_point_id)
    })?;
    Ok(HttpResponse::Ok().json(history))
}

pub async fn assign(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    data_point_id: web::Path<String>,
    body: web::Json<DataPointQaStatusPatch>,
) -> Result<HttpResponse, ApiError> {
    let correlation_id = correlation_id(&req);
    let patch = body.into_inner();
    let review = state.transaction(|ctx| {
        data_point_qa_review_manager::assign_data_point_qa_status(
            ctx,
            &data_point_id,
            patch.qa_status,
            patch.comment,
            &user,
            &correlation_id,
        )
    })?;
    Ok(HttpResponse::Ok().json(review))
}
