use crate::error::ApiError;
use common::model::qa::{DataPointReviewDetails, DatasetReviewResponse, DatasetReviewState};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Row of `dataset_review`. Per-data-point details are kept as a JSON column.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetReviewEntity {
    pub dataset_review_id: String,
    pub dataset_id: String,
    pub company_id: String,
    pub data_type: String,
    pub reporting_period: String,
    pub review_state: DatasetReviewState,
    pub reviewer_user_id: Option<String>,
    pub reviewer_user_name: Option<String>,
    pub data_points: Vec<DataPointReviewDetails>,
}

impl DatasetReviewEntity {
    pub fn to_api_model(&self) -> DatasetReviewResponse {
        DatasetReviewResponse {
            dataset_review_id: self.dataset_review_id.clone(),
            dataset_id: self.dataset_id.clone(),
            company_id: self.company_id.clone(),
            data_type: self.data_type.clone(),
            reporting_period: self.reporting_period.clone(),
            review_state: self.review_state,
            reviewer_user_id: self.reviewer_user_id.clone(),
            reviewer_user_name: self.reviewer_user_name.clone(),
            data_points: self.data_points.clone(),
        }
    }
}

struct DatasetReviewRow {
    dataset_review_id: String,
    dataset_id: String,
    company_id: String,
    data_type: String,
    reporting_period: String,
    review_state: String,
    reviewer_user_id: Option<String>,
    reviewer_user_name: Option<String>,
    data_points: String,
}

impl DatasetReviewRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(DatasetReviewRow {
            dataset_review_id: row.get(0)?,
            dataset_id: row.get(1)?,
            company_id: row.get(2)?,
            data_type: row.get(3)?,
            reporting_period: row.get(4)?,
            review_state: row.get(5)?,
            reviewer_user_id: row.get(6)?,
            reviewer_user_name: row.get(7)?,
            data_points: row.get(8)?,
        })
    }

    fn into_entity(self) -> Result<DatasetReviewEntity, ApiError> {
        Ok(DatasetReviewEntity {
            dataset_review_id: self.dataset_review_id,
            dataset_id: self.dataset_id,
            company_id: self.company_id,
            data_type: self.data_type,
            reporting_period: self.reporting_period,
            review_state: DatasetReviewState::parse(&self.review_state)
                .unwrap_or(DatasetReviewState::Pending),
            reviewer_user_id: self.reviewer_user_id,
            reviewer_user_name: self.reviewer_user_name,
            data_points: serde_json::from_str(&self.data_points)?,
        })
    }
}

const COLUMNS: &str = "dataset_review_id, dataset_id, company_id, data_type, reporting_period, \
    review_state, reviewer_user_id, reviewer_user_name, data_points";

/// Inserts or fully replaces a review.
pub fn save(conn: &Connection, entity: &DatasetReviewEntity) -> Result<(), ApiError> {
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO dataset_review ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ),
        params![
            entity.dataset_review_id,
            entity.dataset_id,
            entity.company_id,
            entity.data_type,
            entity.reporting_period,
            entity.review_state.as_str(),
            entity.reviewer_user_id,
            entity.reviewer_user_name,
            serde_json::to_string(&entity.data_points)?,
        ],
    )?;
    Ok(())
}

pub fn find_by_id(
    conn: &Connection,
    dataset_review_id: &str,
) -> Result<Option<DatasetReviewEntity>, ApiError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM dataset_review WHERE dataset_review_id = ?1"),
            params![dataset_review_id],
            DatasetReviewRow::from_row,
        )
        .optional()?;
    row.map(DatasetReviewRow::into_entity).transpose()
}

pub fn find_by_dataset_id(
    conn: &Connection,
    dataset_id: &str,
) -> Result<Vec<DatasetReviewEntity>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM dataset_review WHERE dataset_id = ?1 ORDER BY rowid"
    ))?;
    let rows = stmt.query_map(params![dataset_id], DatasetReviewRow::from_row)?;
    rows.map(|row| row.map_err(ApiError::from).and_then(DatasetReviewRow::into_entity))
        .collect()
}

pub fn exists_with_state(
    conn: &Connection,
    dataset_id: &str,
    state: DatasetReviewState,
) -> Result<bool, ApiError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM dataset_review WHERE dataset_id = ?1 AND review_state = ?2",
        params![dataset_id, state.as_str()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
