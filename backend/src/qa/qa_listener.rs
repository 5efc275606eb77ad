//! Feeds uploads into the QA review logs.

use crate::error::ApiError;
use crate::messaging::{read_payload, validate_message_type};
use crate::qa::{data_point_qa_review_manager, qa_review_manager};
use crate::state::ServiceContext;
use common::messages::{DataPointUploadedPayload, DatasetUploadedPayload, MessageType, QueueMessage};
use log::info;

/// Handles `DataPointUploaded`.
pub fn add_data_point_to_qa_review(
    ctx: ServiceContext<'_>,
    message: &QueueMessage,
) -> Result<(), ApiError> {
    validate_message_type(message, &[MessageType::DATA_POINT_UPLOADED])?;
    let payload: DataPointUploadedPayload = read_payload(message)?;
    if payload.data_point_id.is_empty() {
        return Err(ApiError::MessageQueueReject(
            "Provided data point ID is empty".to_string(),
        ));
    }
    info!(
        "Received data point '{}' of type '{}' for QA (correlation ID: {})",
        payload.data_point_id, payload.data_point_type, message.correlation_id
    );
    data_point_qa_review_manager::review_data_point_from_message(ctx, &payload, &message.correlation_id)
        .map(|_| ())
}

/// Handles `DatasetQaRequired` and `DatasetUploaded`.
pub fn add_dataset_to_qa_review(
    ctx: ServiceContext<'_>,
    message: &QueueMessage,
) -> Result<(), ApiError> {
    validate_message_type(
        message,
        &[MessageType::DATASET_QA_REQUIRED, MessageType::DATASET_UPLOADED],
    )?;
    let payload: DatasetUploadedPayload = read_payload(message)?;
    if payload.data_id.is_empty() {
        return Err(ApiError::MessageQueueReject(
            "Provided data ID is empty".to_string(),
        ));
    }
    info!(
        "Received dataset '{}' for QA (bypass: {}, correlation ID: {})",
        payload.data_id, payload.bypass_qa, message.correlation_id
    );
    qa_review_manager::add_dataset_to_qa_review_repository(
        ctx,
        &payload.data_id,
        payload.bypass_qa,
        &message.correlation_id,
    )
    .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{drain, MessageQueuePublications};
    use crate::testing;
    use common::messages::QaStatusChangeMessage;

    #[test]
    fn empty_data_id_is_rejected() {
        let setup = testing::setup();
        let (queue, mut rx) = MessageQueuePublications::new();
        queue.publish_dataset_uploaded("", false, "c").unwrap();
        let message = drain(&mut rx).remove(0);
        assert!(matches!(
            setup.state.transaction(|ctx| add_dataset_to_qa_review(ctx, &message)),
            Err(ApiError::MessageQueueReject(_))
        ));
    }

    #[test]
    fn data_point_listener_only_takes_data_point_uploads() {
        let setup = testing::setup();
        let (queue, mut rx) = MessageQueuePublications::new();
        queue
            .publish_qa_status_changed(
                &QaStatusChangeMessage {
                    data_id: "d".to_string(),
                    updated_qa_status: common::model::qa::QaStatus::Accepted,
                    currently_active_data_id: None,
                },
                "c",
            )
            .unwrap();
        let message = drain(&mut rx).remove(0);
        assert!(matches!(
            setup.state.transaction(|ctx| add_data_point_to_qa_review(ctx, &message)),
            Err(ApiError::MessageQueueReject(_))
        ));
    }
}
