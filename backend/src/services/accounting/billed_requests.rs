use crate::accounting::credit_manager;
use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

pub async fn process(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    company_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let billed = state.read(|ctx| credit_manager::list_billed_requests(ctx, &company_id, &user))?;
    Ok(HttpResponse::Ok().json(billed))
}
