use crate::auth::AuthenticatedUser;
use crate::datapoints::assembled_data_manager;
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

/// Handler for `GET /api/data/{data_id}/data-points`: data point ids keyed by data point type.
pub async fn process(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    data_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let mapping = state.read(|ctx| {
        assembled_data_manager::ensure_dataset_viewable(ctx, &data_id, &user)?;
        assembled_data_manager::get_data_points_of_dataset(ctx, &data_id)
    })?;
    Ok(HttpResponse::Ok().json(mapping))
}
