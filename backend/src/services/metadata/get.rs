use crate::auth::AuthenticatedUser;
use crate::datapoints::assembled_data_manager;
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

pub async fn process(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    data_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let meta = state.read(|ctx| assembled_data_manager::ensure_dataset_viewable(ctx, &data_id, &user))?;
    Ok(HttpResponse::Ok().json(meta))
}
