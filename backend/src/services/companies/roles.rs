use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::services::ensure_company_exists;
use crate::state::AppState;
use crate::storage::companies;
use actix_web::{web, HttpResponse};
use common::model::company::{CompanyRole, CompanyRoleAssignment};
use common::requests::CompanyRoleQuery;

pub async fn assign(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(String, String, String)>,
) -> Result<HttpResponse, ApiError> {
    user.require(Role::Admin)?;
    let (role, company_id, user_id) = path.into_inner();
    let company_role = CompanyRole::parse(&role).ok_or_else(|| {
        ApiError::invalid_input("Unknown company role", format!("'{role}' is not a company role."))
    })?;
    let assignment = CompanyRoleAssignment {
        company_role,
        company_id,
        user_id,
    };
    state.transaction(|ctx| {
        ensure_company_exists(ctx, &assignment.company_id)?;
        companies::save_role_assignment(ctx.conn, &assignment)
    })?;
    Ok(HttpResponse::Ok().json(assignment))
}

/// Everybody may list their own assignments; listing other users' requires the admin role.
pub async fn list(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<CompanyRoleQuery>,
) -> Result<HttpResponse, ApiError> {
    if query.user_id.as_deref() != Some(user.user_id.as_str()) {
        user.require(Role::Admin)?;
    }
    let assignments = state.read(|ctx| {
        companies::find_role_assignments(ctx.conn, query.user_id.as_deref(), query.company_id.as_deref())
    })?;
    Ok(HttpResponse::Ok().json(assignments))
}
