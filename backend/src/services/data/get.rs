use crate::auth::AuthenticatedUser;
use crate::datapoints::assembled_data_manager;
use crate::error::ApiError;
use crate::services::correlation_id;
use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::dataset::CompanyAssociatedData;

/// Handler for `GET /api/data/{data_type}/{data_id}`.
pub async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (data_type, data_id) = path.into_inner();
    let correlation_id = correlation_id(&req);
    let dataset = state.read(|ctx| {
        let meta = assembled_data_manager::ensure_dataset_viewable(ctx, &data_id, &user)?;
        let data = assembled_data_manager::get_dataset_data(ctx, &data_id, &data_type, &correlation_id)?;
        Ok(CompanyAssociatedData {
            company_id: meta.company_id,
            reporting_period: meta.reporting_period,
            data,
        })
    })?;
    Ok(HttpResponse::Ok().json(dataset))
}
