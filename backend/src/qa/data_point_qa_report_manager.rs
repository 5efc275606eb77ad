//! QA reports on single data points.
//!
//! At most one report per data point is active. A conclusive verdict also reviews the data point.

use crate::auth::AuthenticatedUser;
use crate::datapoints::data_point_validator;
use crate::error::ApiError;
use crate::qa::data_point_qa_review_manager;
use crate::state::ServiceContext;
use crate::storage::data_point_meta_information;
use crate::storage::data_point_qa_report::{self, DataPointQaReportEntity};
use common::model::qa::{DataPointQaReport, QaReportDataPoint};
use log::info;
use uuid::Uuid;

pub fn create_qa_report(
    ctx: ServiceContext<'_>,
    data_point_id: &str,
    report: &QaReportDataPoint,
    reporter_user_id: &str,
    upload_time: i64,
    correlation_id: &str,
) -> Result<DataPointQaReport, ApiError> {
    let meta = data_point_meta_information::find_by_id(ctx.conn, data_point_id)?.ok_or_else(|| {
        ApiError::not_found(
            "Data point not found",
            format!("No data point with the id '{data_point_id}' could be found."),
        )
    })?;
    if let Some(corrected_data) = &report.corrected_data {
        data_point_validator::validate_serialized(
            ctx.specifications,
            &meta.data_point_type,
            corrected_data,
        )?;
    }
    let entity = DataPointQaReportEntity {
        qa_report_id: Uuid::new_v4().to_string(),
        data_point_id: data_point_id.to_string(),
        data_point_type: meta.data_point_type,
        reporter_user_id: reporter_user_id.to_string(),
        upload_time,
        active: true,
        verdict: report.verdict,
        corrected_data: report.corrected_data.clone(),
        comment: report.comment.clone(),
    };
    data_point_qa_report::deactivate_all_for_data_point(ctx.conn, data_point_id)?;
    data_point_qa_report::insert(ctx.conn, &entity)?;
    info!(
        "Stored QA report '{}' with verdict {:?} for data point '{}' (correlation ID: {})",
        entity.qa_report_id, entity.verdict, data_point_id, correlation_id
    );

    if let Some(status) = report.verdict.to_qa_status() {
        let comment = Some(report.comment.clone()).filter(|comment| !comment.is_empty());
        data_point_qa_review_manager::review_data_point(
            ctx,
            data_point_id,
            status,
            reporter_user_id,
            comment,
            correlation_id,
        )?;
    }
    Ok(entity.to_api_model())
}

/// The report must belong to the given data point.
pub fn get_qa_report(
    ctx: ServiceContext<'_>,
    data_point_id: &str,
    qa_report_id: &str,
) -> Result<DataPointQaReport, ApiError> {
    let entity = data_point_qa_report::find_by_id(ctx.conn, qa_report_id)?.ok_or_else(|| {
        ApiError::not_found(
            "QA report not found",
            format!("No QA report with the id '{qa_report_id}' could be found."),
        )
    })?;
    if entity.data_point_id != data_point_id {
        return Err(ApiError::invalid_input(
            "QA report does not belong to the data point",
            format!("The QA report '{qa_report_id}' is not associated with the data point '{data_point_id}'."),
        ));
    }
    Ok(entity.to_api_model())
}

/// Activates or deactivates a report. Only its reporter or an admin may do so; activating
/// deactivates the other reports of the data point.
pub fn set_qa_report_status(
    ctx: ServiceContext<'_>,
    data_point_id: &str,
    qa_report_id: &str,
    active: bool,
    user: &AuthenticatedUser,
) -> Result<DataPointQaReport, ApiError> {
    let mut report = get_qa_report(ctx, data_point_id, qa_report_id)?;
    if report.reporter_user_id != user.user_id && !user.is_admin() {
        return Err(ApiError::insufficient_rights(
            "Insufficient rights",
            "Only the reporter or an admin may change the status of a QA report.",
        ));
    }
    if active {
        data_point_qa_report::deactivate_all_for_data_point(ctx.conn, data_point_id)?;
    }
    data_point_qa_report::set_active(ctx.conn, qa_report_id, active)?;
    report.active = active;
    Ok(report)
}

/// Reports of a data point, newest first.
pub fn get_all_qa_reports_for_data_point(
    ctx: ServiceContext<'_>,
    data_point_id: &str,
    show_inactive: bool,
    reporter_user_id: Option<&str>,
) -> Result<Vec<DataPointQaReport>, ApiError> {
    Ok(
        data_point_qa_report::search(ctx.conn, data_point_id, show_inactive, reporter_user_id)?
            .iter()
            .map(DataPointQaReportEntity::to_api_model)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::datapoints::data_point_manager::{get_meta_information, store_data_point};
    use crate::datapoints::qa_status_listener;
    use crate::messaging::drain;
    use crate::testing::{self, uploaded_equity};
    use common::messages::MessageType;
    use common::model::qa::{QaReportDataPointVerdict, QaStatus};

    fn report(verdict: QaReportDataPointVerdict, corrected_data: Option<&str>) -> QaReportDataPoint {
        QaReportDataPoint {
            comment: "checked against the annual report".to_string(),
            verdict,
            corrected_data: corrected_data.map(str::to_string),
        }
    }

    fn setup_with_point() -> testing::TestSetup {
        let mut setup = testing::setup();
        setup
            .state
            .transaction(|ctx| {
                store_data_point(ctx, &uploaded_equity("10"), "dp-1", "uploader", 1, false, "c")
                    .map(|_| ())
            })
            .unwrap();
        drain(&mut setup.rx);
        setup
    }

    #[test]
    fn new_report_replaces_the_active_one() {
        let setup = setup_with_point();
        let first = setup
            .state
            .transaction(|ctx| {
                create_qa_report(ctx, "dp-1", &report(QaReportDataPointVerdict::QaInconclusive, None), "r1", 1, "c")
            })
            .unwrap();
        let second = setup
            .state
            .transaction(|ctx| {
                create_qa_report(ctx, "dp-1", &report(QaReportDataPointVerdict::QaInconclusive, None), "r2", 2, "c")
            })
            .unwrap();
        let active = setup
            .state
            .read(|ctx| get_all_qa_reports_for_data_point(ctx, "dp-1", false, None))
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].qa_report_id, second.qa_report_id);
        let all = setup
            .state
            .read(|ctx| get_all_qa_reports_for_data_point(ctx, "dp-1", true, None))
            .unwrap();
        assert_eq!(all.len(), 2);
        assert!(!all.iter().find(|r| r.qa_report_id == first.qa_report_id).unwrap().active);
    }

    #[test]
    fn conclusive_verdict_reviews_the_data_point() {
        let mut setup = setup_with_point();
        setup
            .state
            .transaction(|ctx| {
                create_qa_report(ctx, "dp-1", &report(QaReportDataPointVerdict::QaRejected, None), "r1", 1, "c")
            })
            .unwrap();
        let messages = drain(&mut setup.rx);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_type, MessageType::DATA_POINT_QA_STATUS_CHANGED);
        setup
            .state
            .transaction(|ctx| qa_status_listener::update_data_point_qa_status(ctx, &messages[0]))
            .unwrap();
        let meta = setup.state.read(|ctx| get_meta_information(ctx, "dp-1")).unwrap();
        assert_eq!(meta.qa_status, QaStatus::Rejected);
    }

    #[test]
    fn invalid_corrected_data_is_refused() {
        let setup = setup_with_point();
        let result = setup.state.transaction(|ctx| {
            create_qa_report(
                ctx,
                "dp-1",
                &report(
                    QaReportDataPointVerdict::QaRejected,
                    Some(r#"{"value": -5, "currency": "EUR", "quality": "Reported"}"#),
                ),
                "r1",
                1,
                "c",
            )
        });
        assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
        assert!(setup
            .state
            .read(|ctx| get_all_qa_reports_for_data_point(ctx, "dp-1", true, None))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn report_lookup_checks_the_data_point() {
        let setup = setup_with_point();
        let created = setup
            .state
            .transaction(|ctx| {
                create_qa_report(ctx, "dp-1", &report(QaReportDataPointVerdict::QaNotAttempted, None), "r1", 1, "c")
            })
            .unwrap();
        assert!(matches!(
            setup.state.read(|ctx| get_qa_report(ctx, "dp-2", &created.qa_report_id)),
            Err(ApiError::InvalidInput { .. })
        ));
        assert!(matches!(
            setup.state.read(|ctx| get_qa_report(ctx, "dp-1", "missing")),
            Err(ApiError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn only_reporter_or_admin_changes_status() {
        let setup = setup_with_point();
        let created = setup
            .state
            .transaction(|ctx| {
                create_qa_report(ctx, "dp-1", &report(QaReportDataPointVerdict::QaNotAttempted, None), "r1", 1, "c")
            })
            .unwrap();
        let stranger = AuthenticatedUser::new("r2", &[Role::Reviewer]);
        assert!(matches!(
            setup.state.transaction(|ctx| set_qa_report_status(
                ctx,
                "dp-1",
                &created.qa_report_id,
                false,
                &stranger
            )),
            Err(ApiError::InsufficientRights { .. })
        ));
        let reporter = AuthenticatedUser::new("r1", &[Role::Reviewer]);
        let updated = setup
            .state
            .transaction(|ctx| set_qa_report_status(ctx, "dp-1", &created.qa_report_id, false, &reporter))
            .unwrap();
        assert!(!updated.active);
    }
}
