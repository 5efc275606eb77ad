use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::qa::qa_review_manager;
use crate::services::correlation_id;
use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use common::requests::AssignQaStatusQuery;

pub async fn history(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    data_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let history = state.read(|ctx| qa_review_manager::get_qa_review_history(ctx, &data_id))?;
    Ok(HttpResponse::Ok().json(history))
}

pub async fn assign(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    data_id: web::Path<String>,
    query: web::Query<AssignQaStatusQuery>,
) -> Result<HttpResponse, ApiError> {
    let correlation_id = correlation_id(&req);
    let query = query.into_inner();
    let review = state.transaction(|ctx| {
        qa_review_manager::assign_quality_status(
            ctx,
            &data_id,
            query.qa_status,
            query.comment,
            &user,
            &correlation_id,
        )
    })?;
    Ok(HttpResponse::Ok().json(review))
}

/// Id of the accepted dataset that currently represents the company, framework and period.
/// `204 No Content` when there is none.
pub async fn currently_active(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<(String, String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (company_id, framework, reporting_period) = path.into_inner();
    let active = state.read(|ctx| {
        qa_review_manager::get_data_id_of_currently_active_dataset(
            ctx,
            &company_id,
            &framework,
            &reporting_period,
        )
    })?;
    Ok(match active {
        Some(data_id) => HttpResponse::Ok().json(data_id),
        None => HttpResponse::NoContent().finish(),
    })
}
