use crate::error::ApiError;
use common::model::accounting::{BilledRequest, CreditTransaction};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::str::FromStr;

fn decimal_column(row: &Row<'_>, index: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(index)?;
    Decimal::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub fn insert_transaction(conn: &Connection, transaction: &CreditTransaction) -> Result<(), ApiError> {
    conn.execute(
        "INSERT INTO credit_transactions (transaction_id, company_id, amount, reason, \
         triggering_user_id, timestamp) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            transaction.transaction_id,
            transaction.company_id,
            transaction.amount.to_string(),
            transaction.reason,
            transaction.triggering_user_id,
            transaction.timestamp,
        ],
    )?;
    Ok(())
}

pub fn find_transactions(conn: &Connection, company_id: &str) -> Result<Vec<CreditTransaction>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT transaction_id, company_id, amount, reason, triggering_user_id, timestamp \
         FROM credit_transactions WHERE company_id = ?1 ORDER BY timestamp, rowid",
    )?;
    let rows = stmt.query_map(params![company_id], |row| {
        Ok(CreditTransaction {
            transaction_id: row.get(0)?,
            company_id: row.get(1)?,
            amount: decimal_column(row, 2)?,
            reason: row.get(3)?,
            triggering_user_id: row.get(4)?,
            timestamp: row.get(5)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn insert_billed_request(conn: &Connection, request: &BilledRequest) -> Result<(), ApiError> {
    conn.execute(
        "INSERT INTO billed_requests (billed_company_id, data_sourcing_id, requested_company_id, \
         requested_reporting_period, requested_framework, debt) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            request.billed_company_id,
            request.data_sourcing_id,
            request.requested_company_id,
            request.requested_reporting_period,
            request.requested_framework,
            request.debt.to_string(),
        ],
    )?;
    Ok(())
}

pub fn billed_request_exists(
    conn: &Connection,
    billed_company_id: &str,
    data_sourcing_id: &str,
) -> Result<bool, ApiError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM billed_requests WHERE billed_company_id = ?1 AND data_sourcing_id = ?2",
        params![billed_company_id, data_sourcing_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn find_billed_requests(conn: &Connection, billed_company_id: &str) -> Result<Vec<BilledRequest>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT billed_company_id, data_sourcing_id, requested_company_id, \
         requested_reporting_period, requested_framework, debt \
         FROM billed_requests WHERE billed_company_id = ?1 ORDER BY rowid",
    )?;
    let rows = stmt.query_map(params![billed_company_id], |row| {
        Ok(BilledRequest {
            billed_company_id: row.get(0)?,
            data_sourcing_id: row.get(1)?,
            requested_company_id: row.get(2)?,
            requested_reporting_period: row.get(3)?,
            requested_framework: row.get(4)?,
            debt: decimal_column(row, 5)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
