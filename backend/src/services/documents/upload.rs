use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::documents::{self, DocumentEntity};
use crate::storage::now_millis;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::model::document::DocumentUploadResponse;
use futures_util::StreamExt;
use log::info;
use md5::Context;

fn malformed(e: impl std::fmt::Display) -> ApiError {
    ApiError::invalid_input("Malformed upload", e.to_string())
}

/// Handler for `POST /api/documents`.
pub async fn process(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    user.require(Role::Uploader)?;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(malformed)?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if name.as_deref() != Some("file") {
            continue;
        }
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        let mut content = Vec::new();
        while let Some(chunk) = field.next().await {
            content.extend_from_slice(&chunk.map_err(malformed)?);
        }
        upload = Some((file_name, content));
    }

    let Some((file_name, content)) = upload else {
        return Err(ApiError::invalid_input(
            "Missing file",
            "The upload must contain a part named 'file'.",
        ));
    };
    if content.is_empty() {
        return Err(ApiError::invalid_input("Empty file", "The uploaded file is empty."));
    }

    let mut hasher = Context::new();
    hasher.consume(&content);
    let file_reference = format!("{:x}", hasher.finalize());
    let document = DocumentEntity {
        file_reference: file_reference.clone(),
        file_name: file_name.clone(),
        content,
        uploader_user_id: user.user_id.clone(),
        upload_time: now_millis(),
    };
    let written = state.transaction(|ctx| documents::insert_if_absent(ctx.conn, &document))?;
    if written {
        info!("Stored document '{}' as '{}'", file_name, file_reference);
    } else {
        info!("Document '{}' already stored, upload ignored", file_reference);
    }
    Ok(HttpResponse::Ok().json(DocumentUploadResponse {
        document_id: file_reference,
        file_name,
    }))
}
