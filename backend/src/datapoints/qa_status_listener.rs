//! Applies QA decisions to the meta information of datasets and data points.

use crate::datapoints::data_point_manager;
use crate::error::ApiError;
use crate::messaging::{read_payload, validate_message_type};
use crate::state::ServiceContext;
use crate::storage::{data_meta_information, data_point_meta_information};
use common::messages::{
    DataPointQaStatusChangeMessage, MessageType, QaStatusChangeMessage, QueueMessage,
};
use log::{info, warn};

/// Handles `QaStatusChanged`: stores the new status and moves the active flag.
pub fn update_dataset_qa_status(
    ctx: ServiceContext<'_>,
    message: &QueueMessage,
) -> Result<(), ApiError> {
    validate_message_type(message, &[MessageType::QA_STATUS_CHANGED])?;
    let payload: QaStatusChangeMessage = read_payload(message)?;
    if payload.data_id.is_empty() {
        return Err(ApiError::MessageQueueReject(
            "Provided data ID is empty".to_string(),
        ));
    }
    info!(
        "Received QA status {:?} for dataset '{}' (correlation ID: {})",
        payload.updated_qa_status, payload.data_id, message.correlation_id
    );
    if !data_meta_information::update_qa_status(ctx.conn, &payload.data_id, payload.updated_qa_status)? {
        warn!(
            "No meta information found for dataset '{}' (correlation ID: {})",
            payload.data_id, message.correlation_id
        );
        return Ok(());
    }
    data_meta_information::update_currently_active(
        ctx.conn,
        &payload.data_id,
        payload.currently_active_data_id.as_deref(),
    )
}

/// Handles `DataPointQaStatusChanged`.
pub fn update_data_point_qa_status(
    ctx: ServiceContext<'_>,
    message: &QueueMessage,
) -> Result<(), ApiError> {
    validate_message_type(message, &[MessageType::DATA_POINT_QA_STATUS_CHANGED])?;
    let payload: DataPointQaStatusChangeMessage = read_payload(message)?;
    let Some(meta) = data_point_meta_information::find_by_id(ctx.conn, &payload.data_point_id)? else {
        warn!(
            "No meta information found for data point '{}' (correlation ID: {})",
            payload.data_point_id, message.correlation_id
        );
        return Ok(());
    };
    data_point_meta_information::update_qa_status(
        ctx.conn,
        &payload.data_point_id,
        payload.updated_qa_status,
    )?;
    data_point_manager::update_currently_active_data_point(
        ctx,
        &meta.dimensions(),
        payload.currently_active_data_point_id.as_deref(),
        &message.correlation_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::MessageQueuePublications;
    use crate::testing::{self, uploaded_equity};
    use common::model::qa::QaStatus;

    fn message_of(publish: impl FnOnce(&MessageQueuePublications)) -> QueueMessage {
        let (queue, mut rx) = MessageQueuePublications::new();
        publish(&queue);
        crate::messaging::drain(&mut rx).remove(0)
    }

    #[test]
    fn accepted_point_becomes_active() {
        let setup = testing::setup();
        setup
            .state
            .transaction(|ctx| {
                data_point_manager::store_data_point(ctx, &uploaded_equity("3"), "dp-1", "u", 1, false, "c")
                    .map(|_| ())
            })
            .unwrap();
        let message = message_of(|queue| {
            queue
                .publish_data_point_qa_status_changed(
                    &DataPointQaStatusChangeMessage {
                        data_point_id: "dp-1".to_string(),
                        updated_qa_status: QaStatus::Accepted,
                        currently_active_data_point_id: Some("dp-1".to_string()),
                    },
                    "c",
                )
                .unwrap()
        });
        setup
            .state
            .transaction(|ctx| update_data_point_qa_status(ctx, &message))
            .unwrap();
        let meta = setup
            .state
            .read(|ctx| data_point_manager::get_meta_information(ctx, "dp-1"))
            .unwrap();
        assert_eq!(meta.qa_status, QaStatus::Accepted);
        assert!(meta.currently_active);
    }

    #[test]
    fn wrong_message_type_is_rejected() {
        let setup = testing::setup();
        let message = message_of(|queue| queue.publish_dataset_uploaded("d", false, "c").unwrap());
        assert!(matches!(
            setup
                .state
                .transaction(|ctx| update_dataset_qa_status(ctx, &message)),
            Err(ApiError::MessageQueueReject(_))
        ));
    }
}
