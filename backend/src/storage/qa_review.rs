//! Append-only log of dataset QA status changes. The current status of a dataset is its row
//! with the highest `event_id`.

use crate::error::ApiError;
use common::model::qa::{QaReviewResponse, QaStatus};
use rusqlite::{params, Connection, OptionalExtension, Row};

#[derive(Debug, Clone, PartialEq)]
pub struct QaReviewEntity {
    pub event_id: i64,
    pub data_id: String,
    pub company_id: String,
    pub company_name: String,
    pub framework: String,
    pub reporting_period: String,
    pub timestamp: i64,
    pub qa_status: QaStatus,
    pub triggering_user_id: String,
    pub comment: Option<String>,
}

impl QaReviewEntity {
    pub fn to_api_model(&self) -> QaReviewResponse {
        QaReviewResponse {
            data_id: self.data_id.clone(),
            company_id: self.company_id.clone(),
            company_name: self.company_name.clone(),
            framework: self.framework.clone(),
            reporting_period: self.reporting_period.clone(),
            timestamp: self.timestamp,
            qa_status: self.qa_status,
            triggering_user_id: self.triggering_user_id.clone(),
            comment: self.comment.clone(),
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let qa_status: String = row.get(7)?;
        Ok(QaReviewEntity {
            event_id: row.get(0)?,
            data_id: row.get(1)?,
            company_id: row.get(2)?,
            company_name: row.get(3)?,
            framework: row.get(4)?,
            reporting_period: row.get(5)?,
            timestamp: row.get(6)?,
            qa_status: QaStatus::parse(&qa_status).unwrap_or(QaStatus::Pending),
            triggering_user_id: row.get(8)?,
            comment: row.get(9)?,
        })
    }
}

/// Filter over the latest row per dataset.
#[derive(Debug, Clone, Default)]
pub struct QaReviewFilter {
    pub frameworks: Vec<String>,
    pub reporting_periods: Vec<String>,
    pub company_name: Option<String>,
}

impl QaReviewFilter {
    fn matches(&self, entity: &QaReviewEntity) -> bool {
        (self.frameworks.is_empty() || self.frameworks.contains(&entity.framework))
            && (self.reporting_periods.is_empty()
                || self.reporting_periods.contains(&entity.reporting_period))
            && self.company_name.as_ref().is_none_or(|name| {
                entity
                    .company_name
                    .to_lowercase()
                    .contains(&name.to_lowercase())
            })
    }
}

const COLUMNS: &str = "event_id, data_id, company_id, company_name, framework, reporting_period, \
    timestamp, qa_status, triggering_user_id, comment";

/// Appends a row; `event_id` of the argument is ignored and the stored row is returned.
pub fn append(conn: &Connection, entity: &QaReviewEntity) -> Result<QaReviewEntity, ApiError> {
    conn.execute(
        "INSERT INTO qa_review (data_id, company_id, company_name, framework, reporting_period, \
         timestamp, qa_status, triggering_user_id, comment) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            entity.data_id,
            entity.company_id,
            entity.company_name,
            entity.framework,
            entity.reporting_period,
            entity.timestamp,
            entity.qa_status.as_str(),
            entity.triggering_user_id,
            entity.comment,
        ],
    )?;
    Ok(QaReviewEntity {
        event_id: conn.last_insert_rowid(),
        ..entity.clone()
    })
}

pub fn find_latest(conn: &Connection, data_id: &str) -> Result<Option<QaReviewEntity>, ApiError> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {COLUMNS} FROM qa_review WHERE data_id = ?1 ORDER BY event_id DESC LIMIT 1"
            ),
            params![data_id],
            QaReviewEntity::from_row,
        )
        .optional()?)
}

/// All rows of a dataset, oldest first.
pub fn find_history(conn: &Connection, data_id: &str) -> Result<Vec<QaReviewEntity>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM qa_review WHERE data_id = ?1 ORDER BY event_id"
    ))?;
    let rows = stmt.query_map(params![data_id], QaReviewEntity::from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Latest row of every dataset whose current status is `Pending`, oldest first.
pub fn find_pending(
    conn: &Connection,
    filter: &QaReviewFilter,
) -> Result<Vec<QaReviewEntity>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM qa_review review \
         WHERE review.event_id = (SELECT MAX(sub.event_id) FROM qa_review sub WHERE sub.data_id = review.data_id) \
         AND review.qa_status = 'Pending' ORDER BY review.timestamp, review.event_id"
    ))?;
    let rows = stmt.query_map([], QaReviewEntity::from_row)?;
    let mut pending = Vec::new();
    for row in rows {
        let entity = row?;
        if filter.matches(&entity) {
            pending.push(entity);
        }
    }
    Ok(pending)
}

/// The most recently accepted dataset for a company, framework and reporting period.
pub fn find_currently_active_data_id(
    conn: &Connection,
    company_id: &str,
    framework: &str,
    reporting_period: &str,
) -> Result<Option<String>, ApiError> {
    Ok(conn
        .query_row(
            "SELECT review.data_id FROM qa_review review \
             WHERE review.event_id = (SELECT MAX(sub.event_id) FROM qa_review sub WHERE sub.data_id = review.data_id) \
             AND review.company_id = ?1 AND review.framework = ?2 AND review.reporting_period = ?3 \
             AND review.qa_status = 'Accepted' \
             ORDER BY review.event_id DESC LIMIT 1",
            params![company_id, framework, reporting_period],
            |row| row.get(0),
        )
        .optional()?)
}

pub fn delete_all_by_data_id(conn: &Connection, data_id: &str) -> Result<usize, ApiError> {
    Ok(conn.execute("DELETE FROM qa_review WHERE data_id = ?1", params![data_id])?)
}

/// Rewrites the triggering user of the first row, which records the upload.
pub fn patch_uploader_user_id(
    conn: &Connection,
    data_id: &str,
    uploader_user_id: &str,
) -> Result<bool, ApiError> {
    let changed = conn.execute(
        "UPDATE qa_review SET triggering_user_id = ?1 WHERE event_id = \
         (SELECT MIN(event_id) FROM qa_review WHERE data_id = ?2)",
        params![uploader_user_id, data_id],
    )?;
    Ok(changed > 0)
}
