//! QA review log of single data points.

use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::qa::{chunk, company_name, AUTOMATIC_APPROVAL_COMMENT};
use crate::state::ServiceContext;
use crate::storage::data_point_meta_information;
use crate::storage::data_point_qa_review::{self, DataPointQaReviewEntity, DataPointQaReviewFilter};
use crate::storage::now_millis;
use common::messages::{DataPointQaStatusChangeMessage, DataPointUploadedPayload};
use common::model::qa::{DataPointQaReviewInformation, QaStatus};
use common::requests::DataPointQaQueueQuery;
use log::info;

/// Records the initial review of an uploaded data point.
pub fn review_data_point_from_message(
    ctx: ServiceContext<'_>,
    payload: &DataPointUploadedPayload,
    correlation_id: &str,
) -> Result<DataPointQaReviewInformation, ApiError> {
    let (status, comment) = if payload.bypass_qa {
        (QaStatus::Accepted, Some(AUTOMATIC_APPROVAL_COMMENT.to_string()))
    } else {
        (QaStatus::Pending, None)
    };
    review_data_point(
        ctx,
        &payload.data_point_id,
        status,
        &payload.uploader_user_id,
        comment,
        correlation_id,
    )
}

/// Appends a review row and announces the change together with the now active data point.
pub fn review_data_point(
    ctx: ServiceContext<'_>,
    data_point_id: &str,
    qa_status: QaStatus,
    triggering_user_id: &str,
    comment: Option<String>,
    correlation_id: &str,
) -> Result<DataPointQaReviewInformation, ApiError> {
    let meta = data_point_meta_information::find_by_id(ctx.conn, data_point_id)?.ok_or_else(|| {
        ApiError::not_found(
            "Data point not found",
            format!("No data point with the id '{data_point_id}' could be found."),
        )
    })?;
    info!(
        "Assigning QA status {:?} to data point '{}' (correlation ID: {})",
        qa_status, data_point_id, correlation_id
    );
    let stored = data_point_qa_review::append(
        ctx.conn,
        &DataPointQaReviewEntity {
            event_id: 0,
            data_point_id: data_point_id.to_string(),
            company_id: meta.company_id.clone(),
            company_name: company_name(ctx.conn, &meta.company_id)?,
            data_point_type: meta.data_point_type.clone(),
            reporting_period: meta.reporting_period.clone(),
            timestamp: now_millis(),
            qa_status,
            triggering_user_id: triggering_user_id.to_string(),
            comment,
        },
    )?;
    let currently_active_data_point_id = if qa_status == QaStatus::Accepted {
        Some(data_point_id.to_string())
    } else {
        data_point_qa_review::find_currently_active_data_point_id(ctx.conn, &meta.dimensions())?
    };
    ctx.queue.publish_data_point_qa_status_changed(
        &DataPointQaStatusChangeMessage {
            data_point_id: data_point_id.to_string(),
            updated_qa_status: qa_status,
            currently_active_data_point_id,
        },
        correlation_id,
    )?;
    Ok(stored.to_api_model())
}

/// Reviews the data points of an assembled dataset. Without `overwrite`, points that already
/// have a decision keep it.
pub fn review_assembled_dataset(
    ctx: ServiceContext<'_>,
    data_point_ids: &[String],
    qa_status: QaStatus,
    triggering_user_id: &str,
    comment: Option<&str>,
    overwrite: bool,
    correlation_id: &str,
) -> Result<usize, ApiError> {
    let mut reviewed = 0;
    for data_point_id in data_point_ids {
        if !overwrite {
            let current = data_point_qa_review::find_latest(ctx.conn, data_point_id)?;
            if current.is_some_and(|review| review.qa_status != QaStatus::Pending) {
                continue;
            }
        }
        review_data_point(
            ctx,
            data_point_id,
            qa_status,
            triggering_user_id,
            comment.map(str::to_string),
            correlation_id,
        )?;
        reviewed += 1;
    }
    Ok(reviewed)
}

/// Status change requested by a reviewer.
pub fn assign_data_point_qa_status(
    ctx: ServiceContext<'_>,
    data_point_id: &str,
    qa_status: QaStatus,
    comment: Option<String>,
    user: &AuthenticatedUser,
    correlation_id: &str,
) -> Result<DataPointQaReviewInformation, ApiError> {
    user.require(Role::Reviewer)?;
    if data_point_qa_review::find_latest(ctx.conn, data_point_id)?.is_none() {
        return Err(ApiError::invalid_input(
            "Data point not under review",
            format!("No data point with the id '{data_point_id}' is known to the QA review."),
        ));
    }
    review_data_point(ctx, data_point_id, qa_status, &user.user_id, comment, correlation_id)
}

/// Latest review of every data point matching the query. Without a status filter only pending
/// data points are listed.
pub fn get_data_point_qa_review_queue(
    ctx: ServiceContext<'_>,
    query: &DataPointQaQueueQuery,
) -> Result<Vec<DataPointQaReviewInformation>, ApiError> {
    let filter = DataPointQaReviewFilter {
        company_id: query.company_id.clone(),
        data_point_type: query.data_point_type.clone(),
        reporting_period: query.reporting_period.clone(),
        qa_status: Some(query.qa_status.unwrap_or(QaStatus::Pending)),
    };
    let (limit, offset) = chunk(query.chunk_size, query.chunk_index);
    Ok(
        data_point_qa_review::find_latest_by_filter(ctx.conn, &filter, limit, offset)?
            .iter()
            .map(DataPointQaReviewEntity::to_api_model)
            .collect(),
    )
}

/// Every review of a data point, newest first.
pub fn get_data_point_qa_review_history(
    ctx: ServiceContext<'_>,
    data_point_id: &str,
) -> Result<Vec<DataPointQaReviewInformation>, ApiError> {
    let history = data_point_qa_review::find_history(ctx.conn, data_point_id)?;
    if history.is_empty() {
        return Err(ApiError::not_found(
            "Data point not found",
            format!("No QA review information exists for the data point '{data_point_id}'."),
        ));
    }
    Ok(history.iter().map(DataPointQaReviewEntity::to_api_model).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datapoints::data_point_manager::store_data_point;
    use crate::messaging::{drain, read_payload};
    use crate::testing::{self, uploaded_equity, COMPANY_NAME};
    use common::messages::MessageType;

    fn store(setup: &testing::TestSetup, id: &str) {
        setup
            .state
            .transaction(|ctx| {
                store_data_point(ctx, &uploaded_equity("10"), id, "uploader", 1, false, "c").map(|_| ())
            })
            .unwrap();
    }

    #[test]
    fn bypassed_upload_is_accepted_automatically() {
        let mut setup = testing::setup();
        store(&setup, "dp-1");
        drain(&mut setup.rx);
        let review = setup
            .state
            .transaction(|ctx| {
                review_data_point_from_message(
                    ctx,
                    &DataPointUploadedPayload {
                        data_point_id: "dp-1".to_string(),
                        company_id: testing::COMPANY_ID.to_string(),
                        data_point_type: "extendedCurrencyEquity".to_string(),
                        reporting_period: testing::REPORTING_PERIOD.to_string(),
                        bypass_qa: true,
                        uploader_user_id: "uploader".to_string(),
                        upload_time: 1,
                    },
                    "c",
                )
            })
            .unwrap();
        assert_eq!(review.qa_status, QaStatus::Accepted);
        assert_eq!(review.comment.as_deref(), Some(AUTOMATIC_APPROVAL_COMMENT));
        assert_eq!(review.company_name, COMPANY_NAME);

        let messages = drain(&mut setup.rx);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_type, MessageType::DATA_POINT_QA_STATUS_CHANGED);
        let change: DataPointQaStatusChangeMessage = read_payload(&messages[0]).unwrap();
        assert_eq!(change.currently_active_data_point_id.as_deref(), Some("dp-1"));
    }

    #[test]
    fn rejecting_falls_back_to_the_latest_accepted_point() {
        let mut setup = testing::setup();
        store(&setup, "old");
        store(&setup, "new");
        setup
            .state
            .transaction(|ctx| {
                review_data_point(ctx, "old", QaStatus::Accepted, "r", None, "c")?;
                review_data_point(ctx, "new", QaStatus::Rejected, "r", None, "c")
            })
            .unwrap();
        let messages = drain(&mut setup.rx);
        let last: DataPointQaStatusChangeMessage = read_payload(messages.last().unwrap()).unwrap();
        assert_eq!(last.data_point_id, "new");
        assert_eq!(last.currently_active_data_point_id.as_deref(), Some("old"));
    }

    #[test]
    fn dataset_review_without_overwrite_keeps_decided_points() {
        let setup = testing::setup();
        store(&setup, "a");
        store(&setup, "b");
        let reviewed = setup
            .state
            .transaction(|ctx| {
                review_data_point(ctx, "a", QaStatus::Pending, "u", None, "c")?;
                review_data_point(ctx, "b", QaStatus::Rejected, "r", None, "c")?;
                review_assembled_dataset(
                    ctx,
                    &["a".to_string(), "b".to_string()],
                    QaStatus::Accepted,
                    "r",
                    None,
                    false,
                    "c",
                )
            })
            .unwrap();
        assert_eq!(reviewed, 1);
        let history = setup
            .state
            .read(|ctx| get_data_point_qa_review_history(ctx, "b"))
            .unwrap();
        assert_eq!(history[0].qa_status, QaStatus::Rejected);
    }

    #[test]
    fn queue_lists_pending_points_only() {
        let setup = testing::setup();
        store(&setup, "a");
        store(&setup, "b");
        setup
            .state
            .transaction(|ctx| {
                review_data_point(ctx, "a", QaStatus::Pending, "u", None, "c")?;
                review_data_point(ctx, "b", QaStatus::Pending, "u", None, "c")?;
                review_data_point(ctx, "b", QaStatus::Accepted, "r", None, "c")
            })
            .unwrap();
        let queue = setup
            .state
            .read(|ctx| get_data_point_qa_review_queue(ctx, &DataPointQaQueueQuery::default()))
            .unwrap();
        let ids: Vec<&str> = queue.iter().map(|review| review.data_point_id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn assigning_requires_a_known_data_point_and_reviewer_rights() {
        let setup = testing::setup();
        let reviewer = AuthenticatedUser::new("r", &[Role::Reviewer]);
        let uploader = AuthenticatedUser::new("u", &[Role::Uploader]);
        assert!(matches!(
            setup.state.transaction(|ctx| assign_data_point_qa_status(
                ctx, "unknown", QaStatus::Accepted, None, &reviewer, "c"
            )),
            Err(ApiError::InvalidInput { .. })
        ));
        assert!(matches!(
            setup.state.transaction(|ctx| assign_data_point_qa_status(
                ctx, "unknown", QaStatus::Accepted, None, &uploader, "c"
            )),
            Err(ApiError::InsufficientRights { .. })
        ));
    }
}
