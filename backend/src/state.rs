//! Shared application state and the per-operation service context.
//!
//! `AppState` is created once in `main.rs` and injected into every handler as `web::Data`.
//! It bundles:
//! - the `Database` handle,
//! - the framework/data point specification client,
//! - the producer side of the message queue.
//!
//! Business operations never touch `AppState` directly. They receive a `ServiceContext`: a
//! borrowed view holding the connection of the current transaction and a buffered queue handle.
//! `AppState::transaction` commits the database work first and only then forwards the buffered
//! messages, so listeners never observe rows that were rolled back.

use crate::error::ApiError;
use crate::messaging::MessageQueuePublications;
use crate::specification::SpecificationClient;
use crate::storage::Database;
use rusqlite::Connection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub specifications: Arc<dyn SpecificationClient>,
    pub queue: MessageQueuePublications,
}

/// Everything a manager needs for one operation.
#[derive(Clone, Copy)]
pub struct ServiceContext<'a> {
    pub conn: &'a Connection,
    pub specifications: &'a dyn SpecificationClient,
    pub queue: &'a MessageQueuePublications,
}

impl AppState {
    pub fn new(
        database: Database,
        specifications: Arc<dyn SpecificationClient>,
        queue: MessageQueuePublications,
    ) -> Self {
        AppState {
            database,
            specifications,
            queue,
        }
    }

    /// Runs `f` in a database transaction; messages it publishes are released after the commit.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(ServiceContext<'_>) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let (buffered, mut outbox) = MessageQueuePublications::buffered();
        let result = self.database.transaction(|conn| {
            f(ServiceContext {
                conn,
                specifications: self.specifications.as_ref(),
                queue: &buffered,
            })
        });
        match result {
            Ok(value) => {
                outbox.flush(&self.queue)?;
                Ok(value)
            }
            Err(e) => {
                outbox.discard();
                Err(e)
            }
        }
    }

    /// Read-only access without a transaction.
    pub fn read<T>(
        &self,
        f: impl FnOnce(ServiceContext<'_>) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        self.database.with_connection(|conn| {
            f(ServiceContext {
                conn,
                specifications: self.specifications.as_ref(),
                queue: &self.queue,
            })
        })
    }
}
