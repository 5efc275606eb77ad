use crate::error::ApiError;
use crate::storage::bool_to_sql;
use common::model::dataset::DataMetaInformation;
use common::model::qa::QaStatus;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Row of `data_meta_information`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataMetaInformationEntity {
    pub data_id: String,
    pub company_id: String,
    pub data_type: String,
    pub uploader_user_id: String,
    pub upload_time: i64,
    pub reporting_period: String,
    pub currently_active: bool,
    pub qa_status: QaStatus,
}

impl DataMetaInformationEntity {
    pub fn to_api_model(&self) -> DataMetaInformation {
        DataMetaInformation {
            data_id: self.data_id.clone(),
            company_id: self.company_id.clone(),
            data_type: self.data_type.clone(),
            uploader_user_id: self.uploader_user_id.clone(),
            upload_time: self.upload_time,
            reporting_period: self.reporting_period.clone(),
            currently_active: self.currently_active,
            qa_status: self.qa_status,
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let qa_status: String = row.get(7)?;
        Ok(DataMetaInformationEntity {
            data_id: row.get(0)?,
            company_id: row.get(1)?,
            data_type: row.get(2)?,
            uploader_user_id: row.get(3)?,
            upload_time: row.get(4)?,
            reporting_period: row.get(5)?,
            currently_active: row.get::<_, Option<i64>>(6)?.is_some(),
            qa_status: QaStatus::parse(&qa_status).unwrap_or(QaStatus::Pending),
        })
    }
}

const COLUMNS: &str = "data_id, company_id, data_type, uploader_user_id, upload_time, \
    reporting_period, currently_active, qa_status";

pub fn insert(conn: &Connection, entity: &DataMetaInformationEntity) -> Result<(), ApiError> {
    conn.execute(
        &format!("INSERT INTO data_meta_information ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
        params![
            entity.data_id,
            entity.company_id,
            entity.data_type,
            entity.uploader_user_id,
            entity.upload_time,
            entity.reporting_period,
            bool_to_sql(entity.currently_active),
            entity.qa_status.as_str(),
        ],
    )?;
    Ok(())
}

pub fn find_by_id(
    conn: &Connection,
    data_id: &str,
) -> Result<Option<DataMetaInformationEntity>, ApiError> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM data_meta_information WHERE data_id = ?1"),
            params![data_id],
            DataMetaInformationEntity::from_row,
        )
        .optional()?)
}

pub fn update_qa_status(conn: &Connection, data_id: &str, status: QaStatus) -> Result<bool, ApiError> {
    let changed = conn.execute(
        "UPDATE data_meta_information SET qa_status = ?1 WHERE data_id = ?2",
        params![status.as_str(), data_id],
    )?;
    Ok(changed > 0)
}

/// Makes `new_active_id` the only active dataset for the dimensions of `data_id`, or clears the
/// active flag for those dimensions when `new_active_id` is `None`.
pub fn update_currently_active(
    conn: &Connection,
    data_id: &str,
    new_active_id: Option<&str>,
) -> Result<(), ApiError> {
    let Some(entity) = find_by_id(conn, data_id)? else {
        return Ok(());
    };
    conn.execute(
        "UPDATE data_meta_information SET currently_active = NULL \
         WHERE company_id = ?1 AND data_type = ?2 AND reporting_period = ?3",
        params![entity.company_id, entity.data_type, entity.reporting_period],
    )?;
    if let Some(active_id) = new_active_id {
        conn.execute(
            "UPDATE data_meta_information SET currently_active = 1 WHERE data_id = ?1",
            params![active_id],
        )?;
    }
    Ok(())
}

pub fn search(
    conn: &Connection,
    company_id: Option<&str>,
    data_type: Option<&str>,
    reporting_period: Option<&str>,
    only_active: bool,
) -> Result<Vec<DataMetaInformationEntity>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM data_meta_information \
         WHERE (?1 IS NULL OR company_id = ?1) AND (?2 IS NULL OR data_type = ?2) \
         AND (?3 IS NULL OR reporting_period = ?3) AND (?4 = 0 OR currently_active = 1) \
         ORDER BY upload_time"
    ))?;
    let rows = stmt.query_map(
        params![company_id, data_type, reporting_period, only_active],
        DataMetaInformationEntity::from_row,
    )?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
