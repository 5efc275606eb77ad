use crate::error::ApiError;
use common::model::qa::{QaReportMetaInformation, QaReportWithMetaInformation};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Row of `qa_report`: a QA report over a whole dataset. For assembled datasets the report was
/// also split into data point QA reports, whose ids are kept alongside.
#[derive(Debug, Clone, PartialEq)]
pub struct QaReportEntity {
    pub qa_report_id: String,
    pub data_id: String,
    pub data_type: String,
    pub reporter_user_id: String,
    pub upload_time: i64,
    pub active: bool,
    pub report: String,
    pub data_point_qa_report_ids: Vec<String>,
}

impl QaReportEntity {
    pub fn to_api_model(&self) -> Result<QaReportWithMetaInformation, ApiError> {
        Ok(QaReportWithMetaInformation {
            meta_info: QaReportMetaInformation {
                qa_report_id: self.qa_report_id.clone(),
                data_id: self.data_id.clone(),
                data_type: self.data_type.clone(),
                reporter_user_id: self.reporter_user_id.clone(),
                upload_time: self.upload_time,
                active: self.active,
                data_point_qa_report_ids: self.data_point_qa_report_ids.clone(),
            },
            report: serde_json::from_str(&self.report)?,
        })
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let ids: String = row.get(7)?;
        let data_point_qa_report_ids = serde_json::from_str(&ids)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;
        Ok(QaReportEntity {
            qa_report_id: row.get(0)?,
            data_id: row.get(1)?,
            data_type: row.get(2)?,
            reporter_user_id: row.get(3)?,
            upload_time: row.get(4)?,
            active: row.get(5)?,
            report: row.get(6)?,
            data_point_qa_report_ids,
        })
    }
}

const COLUMNS: &str = "qa_report_id, data_id, data_type, reporter_user_id, upload_time, active, report, \
    data_point_qa_report_ids";

pub fn insert(conn: &Connection, entity: &QaReportEntity) -> Result<(), ApiError> {
    conn.execute(
        &format!("INSERT INTO qa_report ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
        params![
            entity.qa_report_id,
            entity.data_id,
            entity.data_type,
            entity.reporter_user_id,
            entity.upload_time,
            entity.active,
            entity.report,
            serde_json::to_string(&entity.data_point_qa_report_ids)?,
        ],
    )?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, qa_report_id: &str) -> Result<Option<QaReportEntity>, ApiError> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM qa_report WHERE qa_report_id = ?1"),
            params![qa_report_id],
            QaReportEntity::from_row,
        )
        .optional()?)
}

pub fn deactivate_all_for_data_id(conn: &Connection, data_id: &str) -> Result<usize, ApiError> {
    Ok(conn.execute(
        "UPDATE qa_report SET active = 0 WHERE data_id = ?1 AND active = 1",
        params![data_id],
    )?)
}

pub fn set_active(conn: &Connection, qa_report_id: &str, active: bool) -> Result<(), ApiError> {
    conn.execute(
        "UPDATE qa_report SET active = ?1 WHERE qa_report_id = ?2",
        params![active, qa_report_id],
    )?;
    Ok(())
}

pub fn search(
    conn: &Connection,
    data_id: &str,
    show_inactive: bool,
    reporter_user_id: Option<&str>,
) -> Result<Vec<QaReportEntity>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM qa_report WHERE data_id = ?1 \
         AND (?2 = 1 OR active = 1) AND (?3 IS NULL OR reporter_user_id = ?3) \
         ORDER BY upload_time DESC, rowid DESC"
    ))?;
    let rows = stmt.query_map(
        params![data_id, show_inactive, reporter_user_id],
        QaReportEntity::from_row,
    )?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
