use crate::auth::AuthenticatedUser;
use crate::datapoints::data_point_manager::{self, can_view};
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

pub async fn process(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    data_point_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let meta = state.read(|ctx| data_point_manager::get_meta_information(ctx, &data_point_id))?;
    if !can_view(meta.qa_status, &meta.uploader_user_id, &user) {
        return Err(ApiError::insufficient_rights(
            "Access denied",
            format!("The data point '{}' has not been accepted yet.", meta.data_point_id),
        ));
    }
    Ok(HttpResponse::Ok().json(meta))
}
