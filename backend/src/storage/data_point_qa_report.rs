use crate::error::ApiError;
use common::model::qa::{DataPointQaReport, QaReportDataPointVerdict};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Row of `data_point_qa_report`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPointQaReportEntity {
    pub qa_report_id: String,
    pub data_point_id: String,
    pub data_point_type: String,
    pub reporter_user_id: String,
    pub upload_time: i64,
    pub active: bool,
    pub verdict: QaReportDataPointVerdict,
    pub corrected_data: Option<String>,
    pub comment: String,
}

impl DataPointQaReportEntity {
    pub fn to_api_model(&self) -> DataPointQaReport {
        DataPointQaReport {
            qa_report_id: self.qa_report_id.clone(),
            data_point_id: self.data_point_id.clone(),
            data_point_type: self.data_point_type.clone(),
            reporter_user_id: self.reporter_user_id.clone(),
            upload_time: self.upload_time,
            active: self.active,
            comment: self.comment.clone(),
            verdict: self.verdict,
            corrected_data: self.corrected_data.clone(),
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let stored: String = row.get(6)?;
        let verdict = QaReportDataPointVerdict::parse(&stored).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                6,
                Type::Text,
                format!("unknown QA report verdict '{stored}'").into(),
            )
        })?;
        Ok(DataPointQaReportEntity {
            qa_report_id: row.get(0)?,
            data_point_id: row.get(1)?,
            data_point_type: row.get(2)?,
            reporter_user_id: row.get(3)?,
            upload_time: row.get(4)?,
            active: row.get(5)?,
            verdict,
            corrected_data: row.get(7)?,
            comment: row.get(8)?,
        })
    }
}

const COLUMNS: &str = "qa_report_id, data_point_id, data_point_type, reporter_user_id, upload_time, \
    active, verdict, corrected_data, comment";

pub fn insert(conn: &Connection, entity: &DataPointQaReportEntity) -> Result<(), ApiError> {
    conn.execute(
        &format!(
            "INSERT INTO data_point_qa_report ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ),
        params![
            entity.qa_report_id,
            entity.data_point_id,
            entity.data_point_type,
            entity.reporter_user_id,
            entity.upload_time,
            entity.active,
            entity.verdict.as_str(),
            entity.corrected_data,
            entity.comment,
        ],
    )?;
    Ok(())
}

pub fn find_by_id(
    conn: &Connection,
    qa_report_id: &str,
) -> Result<Option<DataPointQaReportEntity>, ApiError> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM data_point_qa_report WHERE qa_report_id = ?1"),
            params![qa_report_id],
            DataPointQaReportEntity::from_row,
        )
        .optional()?)
}

pub fn deactivate_all_for_data_point(conn: &Connection, data_point_id: &str) -> Result<usize, ApiError> {
    Ok(conn.execute(
        "UPDATE data_point_qa_report SET active = 0 WHERE data_point_id = ?1 AND active = 1",
        params![data_point_id],
    )?)
}

pub fn set_active(conn: &Connection, qa_report_id: &str, active: bool) -> Result<(), ApiError> {
    conn.execute(
        "UPDATE data_point_qa_report SET active = ?1 WHERE qa_report_id = ?2",
        params![active, qa_report_id],
    )?;
    Ok(())
}

/// Reports of a data point, newest first.
pub fn search(
    conn: &Connection,
    data_point_id: &str,
    show_inactive: bool,
    reporter_user_id: Option<&str>,
) -> Result<Vec<DataPointQaReportEntity>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM data_point_qa_report WHERE data_point_id = ?1 \
         AND (?2 = 1 OR active = 1) AND (?3 IS NULL OR reporter_user_id = ?3) \
         ORDER BY upload_time DESC, rowid DESC"
    ))?;
    let rows = stmt.query_map(
        params![data_point_id, show_inactive, reporter_user_id],
        DataPointQaReportEntity::from_row,
    )?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    #[test]
    fn unknown_stored_verdict_is_a_conversion_error() {
        let db = Database::in_memory().unwrap();
        db.with_connection(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO data_point_qa_report ({COLUMNS}) \
                     VALUES ('r1', 'dp1', 'plainFiscalYearEnd', 'u', 1, 1, 'Bogus', NULL, '')"
                ),
                [],
            )?;
            Ok(())
        })
        .unwrap();
        let result = db.with_connection(|conn| find_by_id(conn, "r1"));
        assert!(matches!(
            result,
            Err(ApiError::Database(rusqlite::Error::FromSqlConversionFailure(6, Type::Text, _)))
        ));
    }
}
