use crate::error::ApiError;
use rusqlite::{params, Connection, OptionalExtension};

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentEntity {
    pub file_reference: String,
    pub file_name: String,
    pub content: Vec<u8>,
    pub uploader_user_id: String,
    pub upload_time: i64,
}

/// Stores a document unless one with the same reference already exists. Returns whether a row
/// was written.
pub fn insert_if_absent(conn: &Connection, document: &DocumentEntity) -> Result<bool, ApiError> {
    let written = conn.execute(
        "INSERT OR IGNORE INTO documents (file_reference, file_name, content, uploader_user_id, upload_time) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            document.file_reference,
            document.file_name,
            document.content,
            document.uploader_user_id,
            document.upload_time,
        ],
    )?;
    Ok(written > 0)
}

pub fn find(conn: &Connection, file_reference: &str) -> Result<Option<DocumentEntity>, ApiError> {
    Ok(conn
        .query_row(
            "SELECT file_reference, file_name, content, uploader_user_id, upload_time \
             FROM documents WHERE file_reference = ?1",
            params![file_reference],
            |row| {
                Ok(DocumentEntity {
                    file_reference: row.get(0)?,
                    file_name: row.get(1)?,
                    content: row.get(2)?,
                    uploader_user_id: row.get(3)?,
                    upload_time: row.get(4)?,
                })
            },
        )
        .optional()?)
}

pub fn exists(conn: &Connection, file_reference: &str) -> Result<bool, ApiError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM documents WHERE file_reference = ?1",
        params![file_reference],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
