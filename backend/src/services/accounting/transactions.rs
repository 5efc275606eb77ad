use crate::accounting::credit_manager;
use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::CreditTransactionUpload;

pub async fn create(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    company_id: web::Path<String>,
    body: web::Json<CreditTransactionUpload>,
) -> Result<HttpResponse, ApiError> {
    let transaction = state.transaction(|ctx| {
        credit_manager::post_credit_transaction(ctx, &company_id, body.amount, &body.reason, &user)
    })?;
    Ok(HttpResponse::Created().json(transaction))
}

pub async fn list(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    company_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let transactions =
        state.read(|ctx| credit_manager::list_transactions(ctx, &company_id, &user))?;
    Ok(HttpResponse::Ok().json(transactions))
}
