use crate::auth::AuthenticatedUser;
use crate::datapoints::data_point_manager::{self, can_view};
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::DataPointSearchQuery;

pub async fn process(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<DataPointSearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let found = state.read(|ctx| data_point_manager::search(ctx, &query))?;
    let visible: Vec<_> = found
        .into_iter()
        .filter(|meta| can_view(meta.qa_status, &meta.uploader_user_id, &user))
        .collect();
    Ok(HttpResponse::Ok().json(visible))
}
