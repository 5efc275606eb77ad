use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::documents;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use serde_json::json;

pub async fn process(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    file_reference: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let document = state
        .read(|ctx| documents::find(ctx.conn, &file_reference))?
        .ok_or_else(|| {
            ApiError::not_found(
                "Document not found",
                format!("No document with the reference '{file_reference}' exists."),
            )
        })?;
    let mime = mime_guess::from_path(&document.file_name).first_or_octet_stream();
    Ok(HttpResponse::Ok()
        .content_type(mime.as_ref())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(document.file_name)],
        })
        .body(document.content))
}

pub async fn exists(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    file_reference: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let exists = state.read(|ctx| documents::exists(ctx.conn, &file_reference))?;
    Ok(HttpResponse::Ok().json(json!({ "exists": exists })))
}
