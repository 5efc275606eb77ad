use crate::auth::{AuthenticatedUser, Role};
use crate::datapoints::data_point_manager;
use crate::error::ApiError;
use crate::services::{correlation_id, ensure_company_exists};
use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::data_point::UploadedDataPoint;
use common::requests::BypassQaQuery;

/// Handler for `POST /api/data-points`. Returns the meta information of the stored data point.
pub async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<BypassQaQuery>,
    body: web::Json<UploadedDataPoint>,
) -> Result<HttpResponse, ApiError> {
    user.require(Role::Uploader)?;
    let correlation_id = correlation_id(&req);
    let meta = state.transaction(|ctx| {
        ensure_company_exists(ctx, &body.company_id)?;
        data_point_manager::process_data_point(ctx, &body, &user, query.bypass_qa, &correlation_id)
    })?;
    Ok(HttpResponse::Ok().json(meta))
}
