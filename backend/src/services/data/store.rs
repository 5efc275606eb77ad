use crate::auth::{AuthenticatedUser, Role};
use crate::datapoints::assembled_data_manager;
use crate::error::ApiError;
use crate::services::{correlation_id, ensure_company_exists};
use crate::state::AppState;
use crate::storage::now_millis;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::dataset::{CompanyAssociatedData, DataMetaInformationResponse, StorableDataset};
use common::requests::BypassQaQuery;

/// Handler for `POST /api/data/{data_type}`.
///
/// Returns `200 OK` with the id of the new dataset. Validation failures give `400`, and the
/// whole upload is rejected if any data point fails.
pub async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    data_type: web::Path<String>,
    query: web::Query<BypassQaQuery>,
    body: web::Json<CompanyAssociatedData>,
) -> Result<HttpResponse, ApiError> {
    user.require(Role::Uploader)?;
    if query.bypass_qa && !user.has_role(Role::Reviewer) {
        return Err(ApiError::insufficient_rights(
            "Insufficient rights",
            "Bypassing the QA process requires reviewer or admin rights.",
        ));
    }
    let correlation_id = correlation_id(&req);
    let upload = body.into_inner();
    let dataset = StorableDataset {
        company_id: upload.company_id,
        data_type: data_type.into_inner(),
        uploader_user_id: user.user_id.clone(),
        upload_time: now_millis(),
        reporting_period: upload.reporting_period,
        data: serde_json::to_string(&upload.data)?,
    };
    let meta = state.transaction(|ctx| {
        ensure_company_exists(ctx, &dataset.company_id)?;
        assembled_data_manager::store_dataset(ctx, &dataset, query.bypass_qa, &correlation_id)
    })?;
    Ok(HttpResponse::Ok().json(DataMetaInformationResponse {
        data_id: meta.data_id,
        company_id: meta.company_id,
        data_type: meta.data_type,
        reporting_period: meta.reporting_period,
    }))
}
