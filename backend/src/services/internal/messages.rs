use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::messages::QueueMessage;
use log::info;

pub async fn process(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<QueueMessage>,
) -> Result<HttpResponse, ApiError> {
    user.require(Role::Admin)?;
    let message = body.into_inner();
    info!(
        "Accepted external message of type '{}' with routing key '{}' (correlation ID: {})",
        message.message_type, message.routing_key, message.correlation_id
    );
    state.queue.send(message)?;
    Ok(HttpResponse::Accepted().finish())
}
