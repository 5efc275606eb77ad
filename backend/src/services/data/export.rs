use crate::auth::AuthenticatedUser;
use crate::datapoints::assembled_data_manager::{self, ExportFormat};
use crate::error::ApiError;
use crate::services::correlation_id;
use crate::state::AppState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse};
use common::requests::ExportQuery;

/// Handler for `GET /api/data/{data_type}/{data_id}/export?format=csv|json`.
///
/// Serves the assembled dataset as an attachment.
pub async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(String, String)>,
    query: web::Query<ExportQuery>,
) -> Result<HttpResponse, ApiError> {
    let (data_type, data_id) = path.into_inner();
    let format = ExportFormat::parse(query.format.as_deref())?;
    let correlation_id = correlation_id(&req);
    let exported = state.read(|ctx| {
        assembled_data_manager::ensure_dataset_viewable(ctx, &data_id, &user)?;
        assembled_data_manager::export_dataset(ctx, &data_id, &data_type, format, &correlation_id)
    })?;
    Ok(HttpResponse::Ok()
        .content_type(exported.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(exported.file_name)],
        })
        .body(exported.body))
}
