use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::qa::qa_review_manager;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::UploaderPatchQuery;

pub async fn delete(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    data_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    state.transaction(|ctx| qa_review_manager::delete_all_by_data_id(ctx, &data_id, &user))?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn patch_uploader(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    data_id: web::Path<String>,
    query: web::Query<UploaderPatchQuery>,
) -> Result<HttpResponse, ApiError> {
    state.transaction(|ctx| {
        qa_review_manager::patch_uploader_user_id(ctx, &data_id, &query.uploader_user_id, &user)
    })?;
    Ok(HttpResponse::NoContent().finish())
}
