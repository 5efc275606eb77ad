use crate::error::ApiError;
use common::messages::QueueMessage;
use rusqlite::{params, Connection};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetter {
    pub message: QueueMessage,
    pub reason: String,
    pub timestamp: i64,
}

pub fn insert(conn: &Connection, message: &QueueMessage, reason: &str, timestamp: i64) -> Result<(), ApiError> {
    conn.execute(
        "INSERT INTO dead_letter_messages (message_type, correlation_id, routing_key, payload, reason, timestamp) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            message.message_type,
            message.correlation_id,
            message.routing_key,
            message.payload,
            reason,
            timestamp,
        ],
    )?;
    Ok(())
}

pub fn find_all(conn: &Connection) -> Result<Vec<DeadLetter>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT message_type, correlation_id, routing_key, payload, reason, timestamp \
         FROM dead_letter_messages ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(DeadLetter {
            message: QueueMessage {
                message_type: row.get(0)?,
                correlation_id: row.get(1)?,
                routing_key: row.get(2)?,
                payload: row.get(3)?,
            },
            reason: row.get(4)?,
            timestamp: row.get(5)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
