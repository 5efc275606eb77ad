use crate::auth::AuthenticatedUser;
use crate::datapoints::data_point_manager;
use crate::error::ApiError;
use crate::services::correlation_id;
use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse};

pub async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    data_point_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let correlation_id = correlation_id(&req);
    let data_point = state.read(|ctx| {
        data_point_manager::retrieve_data_point(ctx, &data_point_id, &user, &correlation_id)
    })?;
    Ok(HttpResponse::Ok().json(data_point))
}
