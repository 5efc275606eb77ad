//! HTTP surface of the service.
//!
//! Every area registers its own `Scope` through a `configure_routes` function; `configure` mounts
//! them all. Handlers extract the caller with `AuthenticatedUser`, run the operation through
//! `AppState::transaction` (or `AppState::read` for lookups) and return `ApiError` on failure.

pub mod accounting;
pub mod companies;
pub mod data;
pub mod data_points;
pub mod documents;
pub mod internal;
pub mod metadata;
pub mod qa;

use crate::error::ApiError;
use crate::state::ServiceContext;
use crate::storage::companies as company_storage;
use actix_web::{web, HttpRequest};
use uuid::Uuid;

pub const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";

/// Mounts every scope of the API.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(data::configure_routes())
        .service(metadata::configure_routes())
        .service(data_points::configure_routes())
        .service(qa::datasets::configure_routes())
        .service(qa::data_points::configure_routes())
        .service(qa::dataset_reviews::configure_routes())
        .service(accounting::configure_routes())
        .service(companies::configure_routes())
        .service(companies::configure_role_routes())
        .service(documents::configure_routes())
        .service(internal::configure_routes());
}

/// Correlation id of the request: the caller's `X-Correlation-Id`, or a fresh one.
pub(crate) fn correlation_id(req: &HttpRequest) -> String {
    req.headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Data can only be uploaded for registered companies.
pub(crate) fn ensure_company_exists(ctx: ServiceContext<'_>, company_id: &str) -> Result<(), ApiError> {
    match company_storage::find_company(ctx.conn, company_id)? {
        Some(_) => Ok(()),
        None => Err(ApiError::invalid_input(
            "Company not found",
            format!("No company with the id '{company_id}' is registered."),
        )),
    }
}
