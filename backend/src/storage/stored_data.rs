use crate::error::ApiError;
use rusqlite::{params, Connection, OptionalExtension};

/// Stores raw content (a data point envelope or a whole dataset) under its id.
pub fn insert(conn: &Connection, data_id: &str, content: &str) -> Result<(), ApiError> {
    conn.execute(
        "INSERT INTO stored_data (data_id, content) VALUES (?1, ?2)",
        params![data_id, content],
    )?;
    Ok(())
}

pub fn find(conn: &Connection, data_id: &str) -> Result<Option<String>, ApiError> {
    Ok(conn
        .query_row(
            "SELECT content FROM stored_data WHERE data_id = ?1",
            params![data_id],
            |row| row.get(0),
        )
        .optional()?)
}
