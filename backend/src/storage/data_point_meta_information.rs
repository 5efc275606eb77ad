use crate::error::ApiError;
use crate::storage::bool_to_sql;
use common::model::data_point::{BasicDataPointDimensions, DataPointMetaInformation};
use common::model::qa::QaStatus;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Row of `data_point_meta_information`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPointMetaInformationEntity {
    pub data_point_id: String,
    pub data_point_type: String,
    pub company_id: String,
    pub reporting_period: String,
    pub uploader_user_id: String,
    pub upload_time: i64,
    pub currently_active: bool,
    pub qa_status: QaStatus,
}

impl DataPointMetaInformationEntity {
    pub fn to_api_model(&self) -> DataPointMetaInformation {
        DataPointMetaInformation {
            data_point_id: self.data_point_id.clone(),
            data_point_type: self.data_point_type.clone(),
            company_id: self.company_id.clone(),
            reporting_period: self.reporting_period.clone(),
            uploader_user_id: self.uploader_user_id.clone(),
            upload_time: self.upload_time,
            currently_active: self.currently_active,
            qa_status: self.qa_status,
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
        Ok(DataPointMetaInformationEntity {
            data_point_id: row.get(0)?,
            data_point_type: row.get(1)?,
            company_id: row.get(2)?,
            reporting_period: row.get(3)?,
            uploader_user_id: row.get(4)?,
            upload_time: row.get(5)?,
            currently_active: row.get::<_, Option<i64>>(6)?.is_some(),
            qa_status: QaStatus::parse(&qa_status).unwrap_or(QaStatus::Pending),
        })
    }
}

const COLUMNS: &str = "data_point_id, data_point_type, company_id, reporting_period, \
    uploader_user_id, upload_time, currently_active, qa_status";

pub fn insert(conn: &Connection, entity: &DataPointMetaInformationEntity) -> Result<(), ApiError> {
    conn.execute(
        &format!(
            "INSERT INTO data_point_meta_information ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
        ),
        params![
            entity.data_point_id,
            entity.data_point_type,
            entity.company_id,
            entity.reporting_period,
            entity.uploader_user_id,
            entity.upload_time,
            bool_to_sql(entity.currently_active),
            entity.qa_status.as_str(),
        ],
    )?;
    Ok(())
}

pub fn find_by_id(
    conn: &Connection,
    data_point_id: &str,
) -> Result<Option<DataPointMetaInformationEntity>, ApiError> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM data_point_meta_information WHERE data_point_id = ?1"),
            params![data_point_id],
            DataPointMetaInformationEntity::from_row,
        )
        .optional()?)
}

pub fn find_by_ids(
    conn: &Connection,
    data_point_ids: &[String],
) -> Result<Vec<DataPointMetaInformationEntity>, ApiError> {
    let mut found = Vec::with_capacity(data_point_ids.len());
    for id in data_point_ids {
        if let Some(entity) = find_by_id(conn, id)? {
            found.push(entity);
        }
    }
    Ok(found)
}

pub fn update_qa_status(
    conn: &Connection,
    data_point_id: &str,
    status: QaStatus,
) -> Result<bool, ApiError> {
    let changed = conn.execute(
        "UPDATE data_point_meta_information SET qa_status = ?1 WHERE data_point_id = ?2",
        params![status.as_str(), data_point_id],
    )?;
    Ok(changed > 0)
}

pub fn find_currently_active(
    conn: &Connection,
    dimensions: &BasicDataPointDimensions,
) -> Result<Option<DataPointMetaInformationEntity>, ApiError> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {COLUMNS} FROM data_point_meta_information \
                 WHERE company_id = ?1 AND data_point_type = ?2 AND reporting_period = ?3 \
                 AND currently_active = 1"
            ),
            params![
                dimensions.company_id,
                dimensions.data_point_type,
                dimensions.reporting_period
            ],
            DataPointMetaInformationEntity::from_row,
        )
        .optional()?)
}

pub fn set_currently_active(
    conn: &Connection,
    data_point_id: &str,
    active: bool,
) -> Result<(), ApiError> {
    conn.execute(
        "UPDATE data_point_meta_information SET currently_active = ?1 WHERE data_point_id = ?2",
        params![bool_to_sql(active), data_point_id],
    )?;
    Ok(())
}

pub fn search(
    conn: &Connection,
    company_id: Option<&str>,
    data_point_type: Option<&str>,
    reporting_period: Option<&str>,
    only_active: bool,
) -> Result<Vec<DataPointMetaInformationEntity>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM data_point_meta_information \
         WHERE (?1 IS NULL OR company_id = ?1) AND (?2 IS NULL OR data_point_type = ?2) \
         AND (?3 IS NULL OR reporting_period = ?3) AND (?4 = 0 OR currently_active = 1) \
         ORDER BY upload_time"
    ))?;
    let rows = stmt.query_map(
        params![company_id, data_point_type, reporting_period, only_active],
        DataPointMetaInformationEntity::from_row,
    )?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
