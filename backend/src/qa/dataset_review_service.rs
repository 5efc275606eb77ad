//! Aggregate reviews of assembled datasets.
//!
//! A dataset review lists, per data point type, the data point under review and the active QA
//! reports on it, grouped by the reporter's company. The assigned reviewer then settles on one
//! source per type: the original value, a QA report's correction, or a custom value.

use crate::auth::{AuthenticatedUser, Role};
use crate::datapoints::{assembled_data_manager, data_manager, data_point_validator};
use crate::error::ApiError;
use crate::qa::{company_name, UNKNOWN_COMPANY_NAME};
use crate::state::ServiceContext;
use crate::storage::dataset_review::{self, DatasetReviewEntity};
use crate::storage::{companies, data_point_qa_report};
use common::model::qa::{
    AcceptedDataPointSource, DataPointReviewDetails, DatasetReviewResponse, DatasetReviewState,
    QaReportDataPointWithReporterDetails,
};
use common::requests::AcceptedSourcePatch;
use log::info;
use rusqlite::Connection;
use uuid::Uuid;

fn reporter_company(conn: &Connection, reporter_user_id: &str) -> Result<(String, String), ApiError> {
    let assignments = companies::find_role_assignments(conn, Some(reporter_user_id), None)?;
    match assignments.first() {
        Some(assignment) => Ok((
            assignment.company_id.clone(),
            company_name(conn, &assignment.company_id)?,
        )),
        None => Ok((reporter_user_id.to_string(), UNKNOWN_COMPANY_NAME.to_string())),
    }
}

/// The active report on a data point together with its reporter's company. A new report
/// deactivates the earlier ones, so there is at most one entry.
fn reports_by_company(
    conn: &Connection,
    data_point_id: &str,
) -> Result<Vec<QaReportDataPointWithReporterDetails>, ApiError> {
    data_point_qa_report::search(conn, data_point_id, false, None)?
        .into_iter()
        .map(|report| {
            let (company_id, company_name) = reporter_company(conn, &report.reporter_user_id)?;
            Ok(QaReportDataPointWithReporterDetails {
                qa_report_id: report.qa_report_id,
                verdict: report.verdict,
                corrected_data: report.corrected_data,
                reporter_user_id: report.reporter_user_id,
                reporter_company_id: company_id,
                reporter_company_name: company_name,
            })
        })
        .collect()
}

fn find_review(ctx: ServiceContext<'_>, dataset_review_id: &str) -> Result<DatasetReviewEntity, ApiError> {
    dataset_review::find_by_id(ctx.conn, dataset_review_id)?.ok_or_else(|| {
        ApiError::not_found(
            "Dataset review not found",
            format!("No dataset review with the id '{dataset_review_id}' could be found."),
        )
    })
}

fn require_assigned_reviewer(
    review: &DatasetReviewEntity,
    user: &AuthenticatedUser,
) -> Result<(), ApiError> {
    user.require(Role::Reviewer)?;
    if review.reviewer_user_id.as_deref() == Some(user.user_id.as_str()) {
        Ok(())
    } else {
        Err(ApiError::insufficient_rights(
            "Insufficient rights",
            "Only the reviewer assigned to the dataset review may change it.",
        ))
    }
}

/// Opens a review of a dataset, assigned to the caller.
pub fn post_dataset_review(
    ctx: ServiceContext<'_>,
    dataset_id: &str,
    user: &AuthenticatedUser,
) -> Result<DatasetReviewResponse, ApiError> {
    user.require(Role::Reviewer)?;
    if dataset_review::exists_with_state(ctx.conn, dataset_id, DatasetReviewState::Pending)? {
        return Err(ApiError::conflict(
            "Dataset review already exists",
            format!("A pending dataset review already exists for the dataset '{dataset_id}'."),
        ));
    }
    let meta = data_manager::get_dataset_meta_information(ctx, dataset_id)?;
    let mapping = assembled_data_manager::get_data_points_of_dataset(ctx, dataset_id)?;
    let data_points = mapping
        .into_iter()
        .map(|(data_point_type, data_point_id)| {
            Ok(DataPointReviewDetails {
                qa_reports: reports_by_company(ctx.conn, &data_point_id)?,
                data_point_type,
                data_point_id,
                accepted_source: None,
                company_id_of_accepted_qa_report: None,
                custom_value: None,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;
    let review = DatasetReviewEntity {
        dataset_review_id: Uuid::new_v4().to_string(),
        dataset_id: dataset_id.to_string(),
        company_id: meta.company_id,
        data_type: meta.data_type,
        reporting_period: meta.reporting_period,
        review_state: DatasetReviewState::Pending,
        reviewer_user_id: Some(user.user_id.clone()),
        reviewer_user_name: user.user_name.clone(),
        data_points,
    };
    dataset_review::save(ctx.conn, &review)?;
    info!(
        "Opened dataset review '{}' for dataset '{}'",
        review.dataset_review_id, dataset_id
    );
    Ok(review.to_api_model())
}

/// Hands the review over to the caller.
pub fn set_reviewer(
    ctx: ServiceContext<'_>,
    dataset_review_id: &str,
    user: &AuthenticatedUser,
) -> Result<DatasetReviewResponse, ApiError> {
    user.require(Role::Reviewer)?;
    let mut review = find_review(ctx, dataset_review_id)?;
    review.reviewer_user_id = Some(user.user_id.clone());
    review.reviewer_user_name = user.user_name.clone();
    dataset_review::save(ctx.conn, &review)?;
    Ok(review.to_api_model())
}

pub fn set_review_state(
    ctx: ServiceContext<'_>,
    dataset_review_id: &str,
    review_state: DatasetReviewState,
    user: &AuthenticatedUser,
) -> Result<DatasetReviewResponse, ApiError> {
    let mut review = find_review(ctx, dataset_review_id)?;
    require_assigned_reviewer(&review, user)?;
    review.review_state = review_state;
    dataset_review::save(ctx.conn, &review)?;
    info!(
        "Dataset review '{}' is now {:?}",
        dataset_review_id, review_state
    );
    Ok(review.to_api_model())
}

pub fn set_accepted_source(
    ctx: ServiceContext<'_>,
    dataset_review_id: &str,
    patch: &AcceptedSourcePatch,
    user: &AuthenticatedUser,
) -> Result<DatasetReviewResponse, ApiError> {
    let mut review = find_review(ctx, dataset_review_id)?;
    require_assigned_reviewer(&review, user)?;
    let details = review
        .data_points
        .iter_mut()
        .find(|details| details.data_point_type == patch.data_point_type)
        .ok_or_else(|| {
            ApiError::not_found(
                "Data point type not found",
                format!(
                    "The dataset review '{dataset_review_id}' has no data point of type '{}'.",
                    patch.data_point_type
                ),
            )
        })?;
    match patch.accepted_source {
        AcceptedDataPointSource::Original => {
            details.company_id_of_accepted_qa_report = None;
            details.custom_value = None;
        }
        AcceptedDataPointSource::Qa => {
            let company_id = patch
                .company_id_of_accepted_qa_report
                .as_deref()
                .filter(|company_id| {
                    details
                        .qa_reports
                        .iter()
                        .any(|report| report.reporter_company_id == *company_id)
                })
                .ok_or_else(|| {
                    ApiError::invalid_input(
                        "Invalid accepted source",
                        "The accepted QA report must be identified by the company id of one of its reporters.",
                    )
                })?;
            details.company_id_of_accepted_qa_report = Some(company_id.to_string());
            details.custom_value = None;
        }
        AcceptedDataPointSource::Custom => {
            let custom_value = patch.custom_value.as_deref().ok_or_else(|| {
                ApiError::invalid_input(
                    "Invalid accepted source",
                    "A custom value is required when accepting a custom source.",
                )
            })?;
            data_point_validator::validate_serialized(
                ctx.specifications,
                &details.data_point_type,
                custom_value,
            )?;
            details.company_id_of_accepted_qa_report = None;
            details.custom_value = Some(custom_value.to_string());
        }
    }
    details.accepted_source = Some(patch.accepted_source);
    dataset_review::save(ctx.conn, &review)?;
    Ok(review.to_api_model())
}

pub fn get_dataset_review(
    ctx: ServiceContext<'_>,
    dataset_review_id: &str,
) -> Result<DatasetReviewResponse, ApiError> {
    Ok(find_review(ctx, dataset_review_id)?.to_api_model())
}

pub fn get_dataset_reviews_by_dataset_id(
    ctx: ServiceContext<'_>,
    dataset_id: &str,
) -> Result<Vec<DatasetReviewResponse>, ApiError> {
    Ok(dataset_review::find_by_dataset_id(ctx.conn, dataset_id)?
        .iter()
        .map(DatasetReviewEntity::to_api_model)
        .collect())
}
