//! SQLite persistence.
//!
//! `Database` owns a single connection behind a mutex. Repositories are plain functions taking a
//! `&Connection`, so the same function runs inside or outside a transaction. Entity structs in
//! the repository modules mirror table rows and are mapped to API models explicitly.

pub mod accounting;
pub mod companies;
pub mod data_meta_information;
pub mod data_point_meta_information;
pub mod data_point_qa_report;
pub mod data_point_qa_review;
pub mod dataset_datapoint;
pub mod dataset_review;
pub mod dead_letters;
pub mod documents;
pub mod qa_report;
pub mod qa_review;
pub mod stored_data;

use crate::error::ApiError;
use log::info;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS data_meta_information (
    data_id TEXT PRIMARY KEY,
    company_id TEXT NOT NULL,
    data_type TEXT NOT NULL,
    uploader_user_id TEXT NOT NULL,
    upload_time INTEGER NOT NULL,
    reporting_period TEXT NOT NULL,
    currently_active INTEGER,
    qa_status TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS data_point_meta_information (
    data_point_id TEXT PRIMARY KEY,
    data_point_type TEXT NOT NULL,
    company_id TEXT NOT NULL,
    reporting_period TEXT NOT NULL,
    uploader_user_id TEXT NOT NULL,
    upload_time INTEGER NOT NULL,
    currently_active INTEGER,
    qa_status TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS stored_data (
    data_id TEXT PRIMARY KEY,
    content TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS dataset_datapoint (
    dataset_id TEXT PRIMARY KEY,
    data_points TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS qa_review (
    event_id INTEGER PRIMARY KEY AUTOINCREMENT,
    data_id TEXT NOT NULL,
    company_id TEXT NOT NULL,
    company_name TEXT NOT NULL,
    framework TEXT NOT NULL,
    reporting_period TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    qa_status TEXT NOT NULL,
    triggering_user_id TEXT NOT NULL,
    comment TEXT
);
CREATE TABLE IF NOT EXISTS data_point_qa_review (
    event_id INTEGER PRIMARY KEY AUTOINCREMENT,
    data_point_id TEXT NOT NULL,
    company_id TEXT NOT NULL,
    company_name TEXT NOT NULL,
    data_point_type TEXT NOT NULL,
    reporting_period TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    qa_status TEXT NOT NULL,
    triggering_user_id TEXT NOT NULL,
    comment TEXT
);
CREATE TABLE IF NOT EXISTS qa_report (
    qa_report_id TEXT PRIMARY KEY,
    data_id TEXT NOT NULL,
    data_type TEXT NOT NULL,
    reporter_user_id TEXT NOT NULL,
    upload_time INTEGER NOT NULL,
    active INTEGER NOT NULL,
    report TEXT NOT NULL,
    data_point_qa_report_ids TEXT NOT NULL DEFAULT '[]'
);
CREATE TABLE IF NOT EXISTS data_point_qa_report (
    qa_report_id TEXT PRIMARY KEY,
    data_point_id TEXT NOT NULL,
    data_point_type TEXT NOT NULL,
    reporter_user_id TEXT NOT NULL,
    upload_time INTEGER NOT NULL,
    active INTEGER NOT NULL,
    verdict TEXT NOT NULL,
    corrected_data TEXT,
    comment TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS dataset_review (
    dataset_review_id TEXT PRIMARY KEY,
    dataset_id TEXT NOT NULL,
    company_id TEXT NOT NULL,
    data_type TEXT NOT NULL,
    reporting_period TEXT NOT NULL,
    review_state TEXT NOT NULL,
    reviewer_user_id TEXT,
    reviewer_user_name TEXT,
    data_points TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS companies (
    company_id TEXT PRIMARY KEY,
    company_name TEXT NOT NULL,
    headquarters TEXT
);
CREATE TABLE IF NOT EXISTS company_roles (
    company_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    company_role TEXT NOT NULL,
    PRIMARY KEY (company_id, user_id)
);
CREATE TABLE IF NOT EXISTS credit_transactions (
    transaction_id TEXT PRIMARY KEY,
    company_id TEXT NOT NULL,
    amount TEXT NOT NULL,
    reason TEXT NOT NULL,
    triggering_user_id TEXT NOT NULL,
    timestamp INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS billed_requests (
    billed_company_id TEXT NOT NULL,
    data_sourcing_id TEXT NOT NULL,
    requested_company_id TEXT NOT NULL,
    requested_reporting_period TEXT NOT NULL,
    requested_framework TEXT NOT NULL,
    debt TEXT NOT NULL,
    PRIMARY KEY (billed_company_id, data_sourcing_id)
);
CREATE TABLE IF NOT EXISTS documents (
    file_reference TEXT PRIMARY KEY,
    file_name TEXT NOT NULL,
    content BLOB NOT NULL,
    uploader_user_id TEXT NOT NULL,
    upload_time INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS dead_letter_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    message_type TEXT NOT NULL,
    correlation_id TEXT NOT NULL,
    routing_key TEXT NOT NULL,
    payload TEXT NOT NULL,
    reason TEXT NOT NULL,
    timestamp INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_qa_review_data_id ON qa_review (data_id);
CREATE INDEX IF NOT EXISTS idx_data_point_qa_review_id ON data_point_qa_review (data_point_id);
CREATE INDEX IF NOT EXISTS idx_data_point_qa_report_id ON data_point_qa_report (data_point_id);
CREATE INDEX IF NOT EXISTS idx_data_point_meta_dimensions
    ON data_point_meta_information (company_id, data_point_type, reporting_period);
";

/// Shared handle to the service database.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) the database at `path` and applies the schema. `:memory:` opens a
    /// private in-memory database.
    pub fn open(path: &str) -> Result<Self, ApiError> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch(SCHEMA)?;
        info!("Database ready at {}", path);
        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, ApiError> {
        Database::open(":memory:")
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let conn = self.lock();
        f(&conn)
    }

    /// Runs `f` inside a transaction that commits only if `f` succeeds.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub(crate) fn bool_to_sql(value: bool) -> Option<i64> {
    value.then_some(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    #[test]
    fn schema_is_idempotent() {
        let db = Database::in_memory().unwrap();
        db.with_connection(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn failed_transaction_rolls_back() {
        let db = Database::in_memory().unwrap();
        let result: Result<(), ApiError> = db.transaction(|conn| {
            conn.execute(
                "INSERT INTO stored_data (data_id, content) VALUES (?1, ?2)",
                params!["a", "{}"],
            )?;
            Err(ApiError::invalid_input("Stop", "Abort the transaction."))
        });
        assert!(result.is_err());
        let count: i64 = db
            .with_connection(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM stored_data", [], |row| row.get(0))?)
            })
            .unwrap();
        assert_eq!(count, 0);
    }
}
