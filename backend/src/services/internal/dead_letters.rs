use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::dead_letters;
use actix_web::{web, HttpResponse};

pub async fn process(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    user.require(Role::Admin)?;
    let letters = state.read(|ctx| dead_letters::find_all(ctx.conn))?;
    Ok(HttpResponse::Ok().json(letters))
}
