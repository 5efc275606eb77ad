//! QA review of datasets and data points.
//!
//! Review state is an append-only log per dataset (`qa_review_manager`) and per data point
//! (`data_point_qa_review_manager`); the latest row is the current status. Reviewers can attach
//! structured reports (`qa_report_manager`, `data_point_qa_report_manager`) and aggregate them per
//! dataset (`dataset_review_service`). `qa_listener` feeds uploads into the review logs.

pub mod data_point_qa_report_manager;
pub mod data_point_qa_review_manager;
pub mod dataset_review_service;
pub mod qa_listener;
pub mod qa_report_manager;
pub mod qa_review_manager;

use crate::error::ApiError;
use crate::storage::companies;
use rusqlite::Connection;

pub const AUTOMATIC_APPROVAL_COMMENT: &str = "Automatically QA approved.";
pub const UNKNOWN_COMPANY_NAME: &str = "Unknown company";

const DEFAULT_CHUNK_SIZE: usize = 10;

/// Display name of a company, or a placeholder when it is not registered.
pub(crate) fn company_name(conn: &Connection, company_id: &str) -> Result<String, ApiError> {
    Ok(companies::find_company(conn, company_id)?
        .map(|company| company.company_name)
        .unwrap_or_else(|| UNKNOWN_COMPANY_NAME.to_string()))
}

/// `(limit, offset)` of a queue page.
pub(crate) fn chunk(chunk_size: Option<usize>, chunk_index: Option<usize>) -> (usize, usize) {
    let size = chunk_size.filter(|size| *size > 0).unwrap_or(DEFAULT_CHUNK_SIZE);
    (size, size.saturating_mul(chunk_index.unwrap_or(0)))
}

/// Splits a comma-separated query parameter.
pub(crate) fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
