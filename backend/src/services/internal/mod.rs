//! # Internal Service Module
//!
//! Operator endpoints around the message queue. Every route requires the admin role.

mod dead_letters;
mod messages;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/internal";

/// # Registered Routes:
///
/// *   **`POST /messages`**: `messages::process`. Publishes a raw queue message, for example a
///     `RequestSetToProcessing` event from the data sourcing service.
/// *   **`GET /dead-letters`**: `dead_letters::process`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/messages", post().to(messages::process))
        .route("/dead-letters", get().to(dead_letters::process))
}
