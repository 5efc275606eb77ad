use crate::auth::AuthenticatedUser;
use crate::datapoints::data_manager;
use crate::datapoints::data_point_manager::can_view;
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::MetaDataSearchQuery;

/// Lists the meta information of the datasets the caller may see.
pub async fn process(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<MetaDataSearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let found = state.read(|ctx| {
        data_manager::search_meta_information(
            ctx,
            query.company_id.as_deref(),
            query.data_type.as_deref(),
            query.reporting_period.as_deref(),
            query.show_only_active,
        )
    })?;
    let visible: Vec<_> = found
        .into_iter()
        .filter(|meta| can_view(meta.qa_status, &meta.uploader_user_id, &user))
        .collect();
    Ok(HttpResponse::Ok().json(visible))
}
