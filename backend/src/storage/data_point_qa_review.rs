//! Append-only log of data point QA status changes.

use crate::error::ApiError;
use common::model::data_point::BasicDataPointDimensions;
use common::model::qa::{DataPointQaReviewInformation, QaStatus};
use rusqlite::{params, Connection, OptionalExtension, Row};

#[derive(Debug, Clone, PartialEq)]
pub struct DataPointQaReviewEntity {
    pub event_id: i64,
    pub data_point_id: String,
    pub company_id: String,
    pub company_name: String,
    pub data_point_type: String,
    pub reporting_period: String,
    pub timestamp: i64,
    pub qa_status: QaStatus,
    pub triggering_user_id: String,
    pub comment: Option<String>,
}

impl DataPointQaReviewEntity {
    pub fn to_api_model(&self) -> DataPointQaReviewInformation {
        DataPointQaReviewInformation {
            data_point_id: self.data_point_id.clone(),
            company_id: self.company_id.clone(),
            company_name: self.company_name.clone(),
            data_point_type: self.data_point_type.clone(),
            reporting_period: self.reporting_period.clone(),
            timestamp: self.timestamp,
            qa_status: self.qa_status,
            triggering_user_id: self.triggering_user_id.clone(),
            comment: self.comment.clone(),
        }
    }

    pub fn dimensions(&self) -> BasicDataPointDimensions {
        BasicDataPointDimensions {
            company_id: self.company_id.clone(),
            data_point_type: self.data_point_type.clone(),
            reporting_period: self.reporting_period.clone(),
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let qa_status: String = row.get(7)?;
        Ok(DataPointQaReviewEntity {
            event_id: row.get(0)?,
            data_point_id: row.get(1)?,
            company_id: row.get(2)?,
            company_name: row.get(3)?,
            data_point_type: row.get(4)?,
            reporting_period: row.get(5)?,
            timestamp: row.get(6)?,
            qa_status: QaStatus::parse(&qa_status).unwrap_or(QaStatus::Pending),
            triggering_user_id: row.get(8)?,
            comment: row.get(9)?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct DataPointQaReviewFilter {
    pub company_id: Option<String>,
    pub data_point_type: Option<String>,
    pub reporting_period: Option<String>,
    pub qa_status: Option<QaStatus>,
}

const COLUMNS: &str = "event_id, data_point_id, company_id, company_name, data_point_type, \
    reporting_period, timestamp, qa_status, triggering_user_id, comment";

const LATEST_ONLY: &str = "review.event_id = (SELECT MAX(sub.event_id) FROM data_point_qa_review sub \
    WHERE sub.data_point_id = review.data_point_id)";

pub fn append(
    conn: &Connection,
    entity: &DataPointQaReviewEntity,
) -> Result<DataPointQaReviewEntity, ApiError> {
    conn.execute(
        "INSERT INTO data_point_qa_review (data_point_id, company_id, company_name, data_point_type, \
         reporting_period, timestamp, qa_status, triggering_user_id, comment) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            entity.data_point_id,
            entity.company_id,
            entity.company_name,
            entity.data_point_type,
            entity.reporting_period,
            entity.timestamp,
            entity.qa_status.as_str(),
            entity.triggering_user_id,
            entity.comment,
        ],
    )?;
    Ok(DataPointQaReviewEntity {
        event_id: conn.last_insert_rowid(),
        ..entity.clone()
    })
}

pub fn find_latest(
    conn: &Connection,
    data_point_id: &str,
) -> Result<Option<DataPointQaReviewEntity>, ApiError> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {COLUMNS} FROM data_point_qa_review WHERE data_point_id = ?1 \
                 ORDER BY event_id DESC LIMIT 1"
            ),
            params![data_point_id],
            DataPointQaReviewEntity::from_row,
        )
        .optional()?)
}

/// All rows of a data point, newest first.
pub fn find_history(
    conn: &Connection,
    data_point_id: &str,
) -> Result<Vec<DataPointQaReviewEntity>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM data_point_qa_review WHERE data_point_id = ?1 ORDER BY event_id DESC"
    ))?;
    let rows = stmt.query_map(params![data_point_id], DataPointQaReviewEntity::from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Latest row per data point matching the filter, oldest first.
pub fn find_latest_by_filter(
    conn: &Connection,
    filter: &DataPointQaReviewFilter,
    limit: usize,
    offset: usize,
) -> Result<Vec<DataPointQaReviewEntity>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM data_point_qa_review review WHERE {LATEST_ONLY} \
         AND (?1 IS NULL OR review.company_id = ?1) \
         AND (?2 IS NULL OR review.data_point_type = ?2) \
         AND (?3 IS NULL OR review.reporting_period = ?3) \
         AND (?4 IS NULL OR review.qa_status = ?4) \
         ORDER BY review.timestamp, review.event_id LIMIT ?5 OFFSET ?6"
    ))?;
    let rows = stmt.query_map(
        params![
            filter.company_id,
            filter.data_point_type,
            filter.reporting_period,
            filter.qa_status.map(|status| status.as_str()),
            limit as i64,
            offset as i64,
        ],
        DataPointQaReviewEntity::from_row,
    )?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// The most recently accepted data point for the given dimensions.
pub fn find_currently_active_data_point_id(
    conn: &Connection,
    dimensions: &BasicDataPointDimensions,
) -> Result<Option<String>, ApiError> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT review.data_point_id FROM data_point_qa_review review WHERE {LATEST_ONLY} \
                 AND review.company_id = ?1 AND review.data_point_type = ?2 \
                 AND review.reporting_period = ?3 AND review.qa_status = 'Accepted' \
                 ORDER BY review.event_id DESC LIMIT 1"
            ),
            params![
                dimensions.company_id,
                dimensions.data_point_type,
                dimensions.reporting_period
            ],
            |row| row.get(0),
        )
        .optional()?)
}
