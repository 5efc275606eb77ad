//! # Company Service Module
//!
//! Minimal company registry and the company role assignments used for reporter names and
//! billing.

mod register;
mod roles;

use actix_web::web::{get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/companies";
const ROLES_API_PATH: &str = "/api/company-role-assignments";

/// # Registered Routes:
///
/// *   **`POST`**: `register::create`. Uploader role. Returns the company with its new id.
/// *   **`GET /{company_id}`**: `register::get`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(register::create))
        .route("/{company_id}", get().to(register::get))
}

/// # Registered Routes:
///
/// *   **`PUT /{role}/{company_id}/{user_id}`**: `roles::assign`. Admin role.
/// *   **`GET ?userId=&companyId=`**: `roles::list`.
pub fn configure_role_routes() -> Scope {
    scope(ROLES_API_PATH)
        .route("", get().to(roles::list))
        .route("/{role}/{company_id}/{user_id}", put().to(roles::assign))
}
