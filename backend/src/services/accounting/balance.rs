use crate::accounting::credit_manager;
use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

/// Handler for `GET /accounting/credits/{company_id}/balance`.
pub async fn process(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    company_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let balance = state.read(|ctx| credit_manager::get_balance(ctx, &company_id, &user))?;
    Ok(HttpResponse::Ok().json(balance))
}
