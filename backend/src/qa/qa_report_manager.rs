//! QA reports on whole datasets.
//!
//! A report on a dataset stored as data points is split along the framework schema. Every
//! filled leaf becomes a QA report on the data point of that type, and the dataset report
//! keeps the ids of those reports. Reports on datasets stored as a whole are kept as they are.

use crate::auth::AuthenticatedUser;
use crate::datapoints::data_manager;
use crate::error::ApiError;
use crate::qa::data_point_qa_report_manager;
use crate::specification::json_specification;
use crate::state::ServiceContext;
use crate::storage::data_point_qa_report;
use crate::storage::dataset_datapoint::{self, DatasetDatapointEntity};
use crate::storage::qa_report::{self, QaReportEntity};
use common::model::qa::{
    QaReportDataPoint, QaReportDataPointVerdict, QaReportMetaInformation, QaReportWithMetaInformation,
};
use log::info;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

/// One leaf of a dataset QA report. The corrected data is given in the shape of the data point.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetQaReportLeaf {
    #[serde(default)]
    comment: String,
    verdict: QaReportDataPointVerdict,
    #[serde(default)]
    corrected_data: Option<Value>,
}

fn split_into_data_point_reports(
    ctx: ServiceContext<'_>,
    data_type: &str,
    mapping: &DatasetDatapointEntity,
    report: &Value,
    reporter_user_id: &str,
    upload_time: i64,
    correlation_id: &str,
) -> Result<Vec<String>, ApiError> {
    let framework = ctx.specifications.get_framework_specification(data_type).ok_or_else(|| {
        ApiError::invalid_input(
            "Framework not found",
            format!("Framework {data_type} not found."),
        )
    })?;
    let leaves = json_specification::dehydrate(&framework.schema, report)?;
    let mut ids = Vec::new();
    for leaf in leaves.values().filter(|leaf| !leaf.is_empty()) {
        let data_point_id = mapping.data_points.get(&leaf.data_point_type).ok_or_else(|| {
            ApiError::invalid_input(
                "Invalid QA report",
                format!(
                    "The field '{}' is not a data point of the dataset '{}'.",
                    leaf.json_path, mapping.dataset_id
                ),
            )
        })?;
        let parsed: DatasetQaReportLeaf = serde_json::from_value(leaf.content.clone()).map_err(|e| {
            ApiError::invalid_input(
                "Invalid QA report",
                format!("The report at '{}' is malformed: {e}", leaf.json_path),
            )
        })?;
        let corrected_data = parsed
            .corrected_data
            .filter(|value| !value.is_null())
            .map(|value| serde_json::to_string(&value))
            .transpose()?;
        let data_point_report = QaReportDataPoint {
            comment: parsed.comment,
            verdict: parsed.verdict,
            corrected_data,
        };
        let stored = data_point_qa_report_manager::create_qa_report(
            ctx,
            data_point_id,
            &data_point_report,
            reporter_user_id,
            upload_time,
            correlation_id,
        )?;
        ids.push(stored.qa_report_id);
    }
    Ok(ids)
}

pub fn create_qa_report(
    ctx: ServiceContext<'_>,
    data_id: &str,
    report: &Value,
    reporter_user_id: &str,
    upload_time: i64,
    correlation_id: &str,
) -> Result<QaReportMetaInformation, ApiError> {
    let meta = data_manager::get_dataset_meta_information(ctx, data_id)?;
    if !report.is_object() {
        return Err(ApiError::invalid_input(
            "Invalid QA report",
            "A QA report must be a JSON object.",
        ));
    }
    let data_point_qa_report_ids = match dataset_datapoint::find(ctx.conn, data_id)? {
        Some(mapping) => split_into_data_point_reports(
            ctx,
            &meta.data_type,
            &mapping,
            report,
            reporter_user_id,
            upload_time,
            correlation_id,
        )?,
        None => Vec::new(),
    };
    let entity = QaReportEntity {
        qa_report_id: Uuid::new_v4().to_string(),
        data_id: data_id.to_string(),
        data_type: meta.data_type,
        reporter_user_id: reporter_user_id.to_string(),
        upload_time,
        active: true,
        report: serde_json::to_string(report)?,
        data_point_qa_report_ids,
    };
    qa_report::deactivate_all_for_data_id(ctx.conn, data_id)?;
    qa_report::insert(ctx.conn, &entity)?;
    info!(
        "Stored QA report '{}' for dataset '{}' with {} data point reports (correlation ID: {})",
        entity.qa_report_id,
        data_id,
        entity.data_point_qa_report_ids.len(),
        correlation_id
    );
    Ok(entity.to_api_model()?.meta_info)
}

pub fn get_qa_report(
    ctx: ServiceContext<'_>,
    data_id: &str,
    qa_report_id: &str,
) -> Result<QaReportWithMetaInformation, ApiError> {
    let entity = qa_report::find_by_id(ctx.conn, qa_report_id)?.ok_or_else(|| {
        ApiError::not_found(
            "QA report not found",
            format!("No QA report with the id '{qa_report_id}' could be found."),
        )
    })?;
    if entity.data_id != data_id {
        return Err(ApiError::invalid_input(
            "QA report does not belong to the dataset",
            format!("The QA report '{qa_report_id}' is not associated with the dataset '{data_id}'."),
        ));
    }
    entity.to_api_model()
}

/// Activating or deactivating a report on a dataset stored as data points does the same to the
/// data point reports it was split into.
pub fn set_qa_report_status(
    ctx: ServiceContext<'_>,
    data_id: &str,
    qa_report_id: &str,
    active: bool,
    user: &AuthenticatedUser,
) -> Result<QaReportMetaInformation, ApiError> {
    let mut report = get_qa_report(ctx, data_id, qa_report_id)?.meta_info;
    if report.reporter_user_id != user.user_id && !user.is_admin() {
        return Err(ApiError::insufficient_rights(
            "Insufficient rights",
            "Only the reporter or an admin may change the status of a QA report.",
        ));
    }
    if active {
        qa_report::deactivate_all_for_data_id(ctx.conn, data_id)?;
    }
    qa_report::set_active(ctx.conn, qa_report_id, active)?;
    for data_point_qa_report_id in &report.data_point_qa_report_ids {
        if let Some(child) = data_point_qa_report::find_by_id(ctx.conn, data_point_qa_report_id)? {
            data_point_qa_report_manager::set_qa_report_status(
                ctx,
                &child.data_point_id,
                data_point_qa_report_id,
                active,
                user,
            )?;
        }
    }
    report.active = active;
    Ok(report)
}

pub fn get_all_qa_reports_for_dataset(
    ctx: ServiceContext<'_>,
    data_id: &str,
    show_inactive: bool,
    reporter_user_id: Option<&str>,
) -> Result<Vec<QaReportWithMetaInformation>, ApiError> {
    qa_report::search(ctx.conn, data_id, show_inactive, reporter_user_id)?
        .iter()
        .map(QaReportEntity::to_api_model)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::datapoints::assembled_data_manager;
    use crate::testing::{self, sfdr_dataset, COMPANY_ID, REPORTING_PERIOD};
    use common::model::dataset::StorableDataset;
    use serde_json::json;

    fn store_lksg(setup: &testing::TestSetup) -> String {
        let dataset = StorableDataset {
            company_id: COMPANY_ID.to_string(),
            data_type: "lksg".to_string(),
            uploader_user_id: "uploader".to_string(),
            upload_time: 1,
            reporting_period: REPORTING_PERIOD.to_string(),
            data: json!({"general": {"vatIdentificationNumber": "DE123"}}).to_string(),
        };
        setup
            .state
            .transaction(|ctx| data_manager::store_dataset(ctx, &dataset, false, "c"))
            .unwrap()
            .data_id
    }

    fn store_sfdr(setup: &testing::TestSetup) -> String {
        let dataset = StorableDataset {
            company_id: COMPANY_ID.to_string(),
            data_type: "sfdr".to_string(),
            uploader_user_id: "uploader".to_string(),
            upload_time: 1,
            reporting_period: REPORTING_PERIOD.to_string(),
            data: sfdr_dataset().to_string(),
        };
        setup
            .state
            .transaction(|ctx| assembled_data_manager::store_dataset(ctx, &dataset, false, "c"))
            .unwrap()
            .data_id
    }

    fn fiscal_year_end_data_point(setup: &testing::TestSetup, data_id: &str) -> String {
        setup
            .state
            .read(|ctx| dataset_datapoint::find(ctx.conn, data_id))
            .unwrap()
            .unwrap()
            .data_points["plainFiscalYearEnd"]
            .clone()
    }

    #[test]
    fn reports_on_assembled_datasets_are_split_into_data_point_reports() {
        let setup = testing::setup();
        let data_id = store_sfdr(&setup);
        let report = json!({"general": {"general": {"fiscalYearEnd": {
            "verdict": "QaRejected",
            "correctedData": "30-Jun",
            "comment": "The fiscal year ends in June."
        }}}});
        let meta = setup
            .state
            .transaction(|ctx| create_qa_report(ctx, &data_id, &report, "r1", 5, "c"))
            .unwrap();
        assert_eq!(meta.data_point_qa_report_ids.len(), 1);

        let data_point_id = fiscal_year_end_data_point(&setup, &data_id);
        let data_point_reports = setup
            .state
            .read(|ctx| {
                data_point_qa_report_manager::get_all_qa_reports_for_data_point(ctx, &data_point_id, false, None)
            })
            .unwrap();
        assert_eq!(data_point_reports.len(), 1);
        assert_eq!(data_point_reports[0].qa_report_id, meta.data_point_qa_report_ids[0]);
        assert_eq!(data_point_reports[0].verdict, QaReportDataPointVerdict::QaRejected);
        assert_eq!(data_point_reports[0].corrected_data.as_deref(), Some("\"30-Jun\""));

        let stored = setup
            .state
            .read(|ctx| get_qa_report(ctx, &data_id, &meta.qa_report_id))
            .unwrap();
        assert_eq!(stored.meta_info.data_point_qa_report_ids, meta.data_point_qa_report_ids);

        let reporter = AuthenticatedUser::new("r1", &[Role::Reviewer]);
        setup
            .state
            .transaction(|ctx| set_qa_report_status(ctx, &data_id, &meta.qa_report_id, false, &reporter))
            .unwrap();
        assert!(setup
            .state
            .read(|ctx| {
                data_point_qa_report_manager::get_all_qa_reports_for_data_point(ctx, &data_point_id, false, None)
            })
            .unwrap()
            .is_empty());
    }

    #[test]
    fn split_reports_reject_fields_outside_the_framework() {
        let setup = testing::setup();
        let data_id = store_sfdr(&setup);
        let report = json!({"general": {"general": {"unknownField": {"verdict": "QaAccepted"}}}});
        assert!(matches!(
            setup
                .state
                .transaction(|ctx| create_qa_report(ctx, &data_id, &report, "r1", 5, "c")),
            Err(ApiError::InvalidInput { .. })
        ));
        let malformed = json!({"general": {"general": {"fiscalYearEnd": {"verdict": "Maybe"}}}});
        assert!(matches!(
            setup
                .state
                .transaction(|ctx| create_qa_report(ctx, &data_id, &malformed, "r1", 5, "c")),
            Err(ApiError::InvalidInput { .. })
        ));
        assert!(setup
            .state
            .read(|ctx| get_all_qa_reports_for_dataset(ctx, &data_id, true, None))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn latest_report_is_the_active_one() {
        let setup = testing::setup();
        let data_id = store_lksg(&setup);
        let report = json!({"general": {"vatIdentificationNumber": {"verdict": "QaAccepted"}}});
        let first = setup
            .state
            .transaction(|ctx| create_qa_report(ctx, &data_id, &report, "r1", 1, "c"))
            .unwrap();
        let second = setup
            .state
            .transaction(|ctx| create_qa_report(ctx, &data_id, &report, "r2", 2, "c"))
            .unwrap();
        assert_eq!(second.data_type, "lksg");
        let active = setup
            .state
            .read(|ctx| get_all_qa_reports_for_dataset(ctx, &data_id, false, None))
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].meta_info.qa_report_id, second.qa_report_id);
        assert_eq!(active[0].report, report);

        let admin = AuthenticatedUser::new("admin", &[Role::Admin]);
        setup
            .state
            .transaction(|ctx| set_qa_report_status(ctx, &data_id, &first.qa_report_id, true, &admin))
            .unwrap();
        let by_first_reporter = setup
            .state
            .read(|ctx| get_all_qa_reports_for_dataset(ctx, &data_id, false, Some("r1")))
            .unwrap();
        assert_eq!(by_first_reporter.len(), 1);
        assert!(setup
            .state
            .read(|ctx| get_all_qa_reports_for_dataset(ctx, &data_id, false, Some("r2")))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn reports_need_an_existing_dataset() {
        let setup = testing::setup();
        assert!(matches!(
            setup
                .state
                .transaction(|ctx| create_qa_report(ctx, "missing", &json!({}), "r1", 1, "c")),
            Err(ApiError::ResourceNotFound { .. })
        ));
    }
}
