use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::companies;
use actix_web::{web, HttpResponse};
use common::requests::CompanyUpload;
use log::info;
use uuid::Uuid;

pub async fn create(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<CompanyUpload>,
) -> Result<HttpResponse, ApiError> {
    user.require(Role::Uploader)?;
    let upload = body.into_inner();
    if upload.company_name.trim().is_empty() {
        return Err(ApiError::invalid_input(
            "Invalid company",
            "The company name must not be empty.",
        ));
    }
    let company = upload.into_company(Uuid::new_v4().to_string());
    state.transaction(|ctx| companies::save_company(ctx.conn, &company))?;
    info!("Registered company '{}' as '{}'", company.company_name, company.company_id);
    Ok(HttpResponse::Created().json(company))
}

pub async fn get(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    company_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let company = state
        .read(|ctx| companies::find_company(ctx.conn, &company_id))?
        .ok_or_else(|| {
            ApiError::not_found(
                "Company not found",
                format!("No company with the id '{company_id}' is registered."),
            )
        })?;
    Ok(HttpResponse::Ok().json(company))
}
