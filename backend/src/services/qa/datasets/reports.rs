use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::qa::qa_report_manager;
use crate::services::correlation_id;
use crate::state::AppState;
use crate::storage::now_millis;
use actix_web::{web, HttpRequest, HttpResponse};
use common::requests::{QaReportFilter, QaReportStatusPatch};
use serde_json::Value;

pub async fn create(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    data_id: web::Path<String>,
    report: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    user.require(Role::Reviewer)?;
    let correlation_id = correlation_id(&req);
    let meta = state.transaction(|ctx| {
        qa_report_manager::create_qa_report(
            ctx,
            &data_id,
            &report,
            &user.user_id,
            now_millis(),
            &correlation_id,
        )
    })?;
    Ok(HttpResponse::Ok().json(meta))
}

pub async fn list(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    data_id: web::Path<String>,
    filter: web::Query<QaReportFilter>,
) -> Result<HttpResponse, ApiError> {
    let reports = state.read(|ctx| {
        qa_report_manager::get_all_qa_reports_for_dataset(
            ctx,
            &data_id,
            filter.show_inactive,
            filter.reporter_user_id.as_deref(),
        )
    })?;
    Ok(HttpResponse::Ok().json(reports))
}

pub async fn get(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (data_id, qa_report_id) = path.into_inner();
    let report = state.read(|ctx| qa_report_manager::get_qa_report(ctx, &data_id, &qa_report_id))?;
    Ok(HttpResponse::Ok().json(report))
}

pub async fn set_status(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(String, String)>,
    body: web::Json<QaReportStatusPatch>,
) -> Result<HttpResponse, ApiError> {
    let (data_id, qa_report_id) = path.into_inner();
    let meta = state.transaction(|ctx| {
        qa_report_manager::set_qa_report_status(ctx, &data_id, &qa_report_id, body.active, &user)
    })?;
    Ok(HttpResponse::Ok().json(meta))
}
