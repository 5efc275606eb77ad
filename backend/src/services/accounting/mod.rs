//! # Accounting Service Module
//!
//! Credit transactions, balances and billed data sourcing requests per company.

mod balance;
mod billed_requests;
mod transactions;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/accounting/credits";

/// Configures and returns the Actix `Scope` for the accounting routes.
///
/// # Registered Routes:
///
/// *   **`POST /{company_id}/transactions`**: `transactions::create`. Admin role.
/// *   **`GET /{company_id}/transactions`**: `transactions::list`.
/// *   **`GET /{company_id}/balance`**: `balance::process`.
/// *   **`GET /{company_id}/billed-requests`**: `billed_requests::process`.
///
/// The read routes are open to admins and to members of the company.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/{company_id}/transactions", post().to(transactions::create))
        .route("/{company_id}/transactions", get().to(transactions::list))
        .route("/{company_id}/balance", get().to(balance::process))
        .route("/{company_id}/billed-requests", get().to(billed_requests::process))
}
