//! QA review log of datasets.

use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::qa::{chunk, company_name, data_point_qa_review_manager, split_list, AUTOMATIC_APPROVAL_COMMENT};
use crate::state::ServiceContext;
use crate::storage::qa_review::{self, QaReviewEntity, QaReviewFilter};
use crate::storage::{data_meta_information, dataset_datapoint, now_millis};
use common::messages::{QaCompletedMessage, QaStatusChangeMessage};
use common::model::qa::{QaReviewResponse, QaStatus};
use common::requests::QaQueueQuery;
use log::info;

fn filter_of(query: &QaQueueQuery) -> QaReviewFilter {
    QaReviewFilter {
        frameworks: split_list(query.data_types.as_deref()),
        reporting_periods: split_list(query.reporting_periods.as_deref()),
        company_name: query.company_name.clone().filter(|name| !name.is_empty()),
    }
}

fn not_under_review(data_id: &str) -> ApiError {
    ApiError::invalid_input(
        "Dataset not under review",
        format!("No dataset with the id '{data_id}' could be found in the QA review log."),
    )
}

fn append_and_announce(
    ctx: ServiceContext<'_>,
    entity: QaReviewEntity,
    correlation_id: &str,
) -> Result<QaReviewEntity, ApiError> {
    let stored = qa_review::append(ctx.conn, &entity)?;
    let currently_active_data_id = qa_review::find_currently_active_data_id(
        ctx.conn,
        &stored.company_id,
        &stored.framework,
        &stored.reporting_period,
    )?;
    ctx.queue.publish_qa_status_changed(
        &QaStatusChangeMessage {
            data_id: stored.data_id.clone(),
            updated_qa_status: stored.qa_status,
            currently_active_data_id,
        },
        correlation_id,
    )?;
    Ok(stored)
}

/// First entry of a freshly uploaded dataset: `Pending`, or `Accepted` when QA is bypassed.
pub fn add_dataset_to_qa_review_repository(
    ctx: ServiceContext<'_>,
    data_id: &str,
    bypass_qa: bool,
    correlation_id: &str,
) -> Result<QaReviewResponse, ApiError> {
    let meta = data_meta_information::find_by_id(ctx.conn, data_id)?.ok_or_else(|| {
        ApiError::not_found(
            "Dataset not found",
            format!("No dataset with the id '{data_id}' could be found."),
        )
    })?;
    let (qa_status, comment) = if bypass_qa {
        (QaStatus::Accepted, Some(AUTOMATIC_APPROVAL_COMMENT.to_string()))
    } else {
        (QaStatus::Pending, None)
    };
    info!(
        "Adding dataset '{}' to the QA review log as {:?} (correlation ID: {})",
        data_id, qa_status, correlation_id
    );
    let stored = append_and_announce(
        ctx,
        QaReviewEntity {
            event_id: 0,
            data_id: data_id.to_string(),
            company_name: company_name(ctx.conn, &meta.company_id)?,
            company_id: meta.company_id,
            framework: meta.data_type,
            reporting_period: meta.reporting_period,
            timestamp: now_millis(),
            qa_status,
            triggering_user_id: meta.uploader_user_id,
            comment,
        },
        correlation_id,
    )?;
    Ok(stored.to_api_model())
}

/// Pending datasets, oldest first, one chunk at a time.
pub fn get_unreviewed_datasets(
    ctx: ServiceContext<'_>,
    query: &QaQueueQuery,
) -> Result<Vec<QaReviewResponse>, ApiError> {
    let (limit, offset) = chunk(query.chunk_size, query.chunk_index);
    Ok(qa_review::find_pending(ctx.conn, &filter_of(query))?
        .iter()
        .skip(offset)
        .take(limit)
        .map(QaReviewEntity::to_api_model)
        .collect())
}

pub fn get_unreviewed_datasets_ids(
    ctx: ServiceContext<'_>,
    query: &QaQueueQuery,
) -> Result<Vec<String>, ApiError> {
    Ok(get_unreviewed_datasets(ctx, query)?
        .into_iter()
        .map(|review| review.data_id)
        .collect())
}

pub fn number_of_pending_datasets(
    ctx: ServiceContext<'_>,
    query: &QaQueueQuery,
) -> Result<usize, ApiError> {
    Ok(qa_review::find_pending(ctx.conn, &filter_of(query))?.len())
}

/// A reviewer's decision on a dataset. For datasets assembled from data points the decision is
/// passed on to every data point.
pub fn assign_quality_status(
    ctx: ServiceContext<'_>,
    data_id: &str,
    qa_status: QaStatus,
    comment: Option<String>,
    user: &AuthenticatedUser,
    correlation_id: &str,
) -> Result<QaReviewResponse, ApiError> {
    user.require(Role::Reviewer)?;
    let latest = qa_review::find_latest(ctx.conn, data_id)?.ok_or_else(|| not_under_review(data_id))?;
    info!(
        "Reviewer '{}' assigns {:?} to dataset '{}' (correlation ID: {})",
        user.user_id, qa_status, data_id, correlation_id
    );
    let stored = append_and_announce(
        ctx,
        QaReviewEntity {
            event_id: 0,
            timestamp: now_millis(),
            qa_status,
            triggering_user_id: user.user_id.clone(),
            comment: comment.clone(),
            ..latest
        },
        correlation_id,
    )?;
    ctx.queue.publish_qa_completed(
        &QaCompletedMessage {
            identifier: data_id.to_string(),
            validation_result: qa_status,
            reviewer_id: user.user_id.clone(),
            message: comment.clone(),
        },
        correlation_id,
    )?;
    if let Some(mapping) = dataset_datapoint::find(ctx.conn, data_id)? {
        let data_point_ids: Vec<String> = mapping.data_points.into_values().collect();
        data_point_qa_review_manager::review_assembled_dataset(
            ctx,
            &data_point_ids,
            qa_status,
            &user.user_id,
            comment.as_deref(),
            true,
            correlation_id,
        )?;
    }
    Ok(stored.to_api_model())
}

/// Every entry of a dataset, oldest first.
pub fn get_qa_review_history(
    ctx: ServiceContext<'_>,
    data_id: &str,
) -> Result<Vec<QaReviewResponse>, ApiError> {
    let history = qa_review::find_history(ctx.conn, data_id)?;
    if history.is_empty() {
        return Err(ApiError::not_found(
            "Dataset not found",
            format!("No QA review information exists for the dataset '{data_id}'."),
        ));
    }
    Ok(history.iter().map(QaReviewEntity::to_api_model).collect())
}

pub fn get_data_id_of_currently_active_dataset(
    ctx: ServiceContext<'_>,
    company_id: &str,
    framework: &str,
    reporting_period: &str,
) -> Result<Option<String>, ApiError> {
    qa_review::find_currently_active_data_id(ctx.conn, company_id, framework, reporting_period)
}

/// Drops the review log of a dataset. Admin only.
pub fn delete_all_by_data_id(
    ctx: ServiceContext<'_>,
    data_id: &str,
    user: &AuthenticatedUser,
) -> Result<usize, ApiError> {
    user.require(Role::Admin)?;
    let deleted = qa_review::delete_all_by_data_id(ctx.conn, data_id)?;
    info!("Deleted {} QA review entries of dataset '{}'", deleted, data_id);
    Ok(deleted)
}

/// Rewrites the uploader recorded in the first entry. Admin only.
pub fn patch_uploader_user_id(
    ctx: ServiceContext<'_>,
    data_id: &str,
    uploader_user_id: &str,
    user: &AuthenticatedUser,
) -> Result<(), ApiError> {
    user.require(Role::Admin)?;
    if qa_review::patch_uploader_user_id(ctx.conn, data_id, uploader_user_id)? {
        Ok(())
    } else {
        Err(not_under_review(data_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datapoints::assembled_data_manager;
    use crate::messaging::{drain, read_payload};
    use crate::testing::{self, sfdr_dataset, COMPANY_ID, COMPANY_NAME, REPORTING_PERIOD};
    use common::messages::{DataPointQaStatusChangeMessage, MessageType};
    use common::model::dataset::StorableDataset;
    use pretty_assertions::assert_eq;

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

    fn reviewer() -> AuthenticatedUser {
        AuthenticatedUser::new("reviewer", &[Role::Reviewer])
    }

    #[test]
    fn uploaded_dataset_enters_the_queue_as_pending() {
        let mut setup = testing::setup();
        let data_id = store_sfdr(&setup);
        drain(&mut setup.rx);
        let review = setup
            .state
            .transaction(|ctx| add_dataset_to_qa_review_repository(ctx, &data_id, false, "c"))
            .unwrap();
        assert_eq!(review.qa_status, QaStatus::Pending);
        assert_eq!(review.company_name, COMPANY_NAME);
        assert_eq!(review.triggering_user_id, "uploader");

        let query = QaQueueQuery {
            data_types: Some("sfdr".to_string()),
            ..Default::default()
        };
        let ids = setup
            .state
            .read(|ctx| get_unreviewed_datasets_ids(ctx, &query))
            .unwrap();
        assert_eq!(ids, vec![data_id]);
        let other = QaQueueQuery {
            data_types: Some("lksg".to_string()),
            ..Default::default()
        };
        assert_eq!(
            setup.state.read(|ctx| number_of_pending_datasets(ctx, &other)).unwrap(),
            0
        );
    }

    #[test]
    fn bypassed_dataset_is_accepted_and_active() {
        let mut setup = testing::setup();
        let data_id = store_sfdr(&setup);
        drain(&mut setup.rx);
        setup
            .state
            .transaction(|ctx| add_dataset_to_qa_review_repository(ctx, &data_id, true, "c"))
            .unwrap();
        let messages = drain(&mut setup.rx);
        assert_eq!(messages.len(), 1);
        let change: QaStatusChangeMessage = read_payload(&messages[0]).unwrap();
        assert_eq!(change.updated_qa_status, QaStatus::Accepted);
        assert_eq!(change.currently_active_data_id, Some(data_id));
    }

    #[test]
    fn accepting_an_assembled_dataset_accepts_its_data_points() {
        let mut setup = testing::setup();
        let data_id = store_sfdr(&setup);
        setup
            .state
            .transaction(|ctx| add_dataset_to_qa_review_repository(ctx, &data_id, false, "c"))
            .unwrap();
        drain(&mut setup.rx);

        let review = setup
            .state
            .transaction(|ctx| {
                assign_quality_status(
                    ctx,
                    &data_id,
                    QaStatus::Accepted,
                    Some("fine".to_string()),
                    &reviewer(),
                    "c",
                )
            })
            .unwrap();
        assert_eq!(review.qa_status, QaStatus::Accepted);
        assert_eq!(review.company_id, COMPANY_ID);

        let messages = drain(&mut setup.rx);
        let types: Vec<&str> = messages.iter().map(|m| m.message_type.as_str()).collect();
        assert_eq!(types[0], MessageType::QA_STATUS_CHANGED);
        assert_eq!(types[1], MessageType::QA_COMPLETED);
        let point_changes: Vec<DataPointQaStatusChangeMessage> = messages
            .iter()
            .filter(|m| m.message_type == MessageType::DATA_POINT_QA_STATUS_CHANGED)
            .map(|m| read_payload(m).unwrap())
            .collect();
        assert_eq!(point_changes.len(), 4);
        assert!(point_changes
            .iter()
            .all(|change| change.updated_qa_status == QaStatus::Accepted));

        let history = setup
            .state
            .read(|ctx| get_qa_review_history(ctx, &data_id))
            .unwrap();
        let statuses: Vec<QaStatus> = history.iter().map(|entry| entry.qa_status).collect();
        assert_eq!(statuses, vec![QaStatus::Pending, QaStatus::Accepted]);
        assert_eq!(
            setup
                .state
                .read(|ctx| get_data_id_of_currently_active_dataset(
                    ctx,
                    COMPANY_ID,
                    "sfdr",
                    REPORTING_PERIOD
                ))
                .unwrap(),
            Some(data_id)
        );
    }

    #[test]
    fn unknown_dataset_cannot_be_reviewed() {
        let setup = testing::setup();
        assert!(matches!(
            setup.state.transaction(|ctx| assign_quality_status(
                ctx,
                "missing",
                QaStatus::Accepted,
                None,
                &reviewer(),
                "c"
            )),
            Err(ApiError::InvalidInput { .. })
        ));
    }

    #[test]
    fn only_admins_rewrite_the_log() {
        let setup = testing::setup();
        let data_id = store_sfdr(&setup);
        setup
            .state
            .transaction(|ctx| add_dataset_to_qa_review_repository(ctx, &data_id, false, "c"))
            .unwrap();
        assert!(matches!(
            setup
                .state
                .transaction(|ctx| delete_all_by_data_id(ctx, &data_id, &reviewer())),
            Err(ApiError::InsufficientRights { .. })
        ));
        let admin = AuthenticatedUser::new("admin", &[Role::Admin]);
        setup
            .state
            .transaction(|ctx| patch_uploader_user_id(ctx, &data_id, "new-uploader", &admin))
            .unwrap();
        let history = setup
            .state
            .read(|ctx| get_qa_review_history(ctx, &data_id))
            .unwrap();
        assert_eq!(history[0].triggering_user_id, "new-uploader");
        assert_eq!(
            setup
                .state
                .transaction(|ctx| delete_all_by_data_id(ctx, &data_id, &admin))
                .unwrap(),
            1
        );
    }
}
