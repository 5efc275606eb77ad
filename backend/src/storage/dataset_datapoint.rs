use crate::error::ApiError;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;

/// Mapping of a composite dataset to its data points, keyed by data point type.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetDatapointEntity {
    pub dataset_id: String,
    pub data_points: BTreeMap<String, String>,
}

pub fn save(conn: &Connection, entity: &DatasetDatapointEntity) -> Result<(), ApiError> {
    conn.execute(
        "INSERT OR REPLACE INTO dataset_datapoint (dataset_id, data_points) VALUES (?1, ?2)",
        params![entity.dataset_id, serde_json::to_string(&entity.data_points)?],
    )?;
    Ok(())
}

pub fn find(conn: &Connection, dataset_id: &str) -> Result<Option<DatasetDatapointEntity>, ApiError> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT data_points FROM dataset_datapoint WHERE dataset_id = ?1",
            params![dataset_id],
            |row| row.get(0),
        )
        .optional()?;
    match stored {
        Some(json) => Ok(Some(DatasetDatapointEntity {
            dataset_id: dataset_id.to_string(),
            data_points: serde_json::from_str(&json)?,
        })),
        None => Ok(None),
    }
}
