//! Routes queue messages to their listeners.
//!
//! `start_message_dispatcher` is spawned once in `main.rs` and runs for the lifetime of the server.
//! Each message is handled in its own database transaction on the blocking thread pool. A message
//! whose listener fails is stored as a dead letter together with the reason; there are no retries.

use crate::accounting::billed_request_listener;
use crate::datapoints::qa_status_listener;
use crate::error::ApiError;
use crate::messaging::read_payload;
use crate::qa::qa_listener;
use crate::state::AppState;
use crate::storage::{dead_letters, now_millis};
use common::messages::{QaCompletedMessage, QueueMessage, RoutingKeys};
use log::{debug, error, info};
use tokio::sync::mpsc;

/// Calls the listener bound to the message's routing key.
pub fn dispatch(state: &AppState, message: &QueueMessage) -> Result<(), ApiError> {
    match message.routing_key.as_str() {
        RoutingKeys::DATA_POINT_UPLOAD => {
            state.transaction(|ctx| qa_listener::add_data_point_to_qa_review(ctx, message))
        }
        RoutingKeys::DATASET_UPLOAD => {
            state.transaction(|ctx| qa_listener::add_dataset_to_qa_review(ctx, message))
        }
        RoutingKeys::QA_STATUS_CHANGE => {
            state.transaction(|ctx| qa_status_listener::update_dataset_qa_status(ctx, message))
        }
        RoutingKeys::DATA_POINT_QA_STATUS_CHANGE => state
            .transaction(|ctx| qa_status_listener::update_data_point_qa_status(ctx, message)),
        RoutingKeys::DATA_SOURCING_PROCESSING => state
            .transaction(|ctx| billed_request_listener::bill_request(ctx, message))
            .map(|_| ()),
        RoutingKeys::QA_COMPLETED => {
            let completed: QaCompletedMessage = read_payload(message)?;
            debug!(
                "QA of '{}' completed with {:?} by '{}' (correlation ID: {})",
                completed.identifier,
                completed.validation_result,
                completed.reviewer_id,
                message.correlation_id
            );
            Ok(())
        }
        other => Err(ApiError::MessageQueueReject(format!(
            "No listener is bound to the routing key '{other}'"
        ))),
    }
}

/// Dispatches one message and dead-letters it on failure. Returns whether it was handled.
pub fn handle_message(state: &AppState, message: &QueueMessage) -> bool {
    match dispatch(state, message) {
        Ok(()) => true,
        Err(e) => {
            error!(
                "Message of type '{}' failed and is dead-lettered (correlation ID: {}): {}",
                message.message_type, message.correlation_id, e
            );
            let stored = state.database.with_connection(|conn| {
                dead_letters::insert(conn, message, &e.to_string(), now_millis())
            });
            if let Err(e) = stored {
                error!("Could not store dead letter: {}", e);
            }
            false
        }
    }
}

/// Handles every message currently waiting in `rx`, including the ones published while doing so.
/// Returns the number of messages processed.
pub fn process_pending(state: &AppState, rx: &mut mpsc::UnboundedReceiver<QueueMessage>) -> usize {
    let mut processed = 0;
    while let Ok(message) = rx.try_recv() {
        handle_message(state, &message);
        processed += 1;
    }
    processed
}

/// Long-running consumer of the message queue.
pub async fn start_message_dispatcher(state: AppState, mut rx: mpsc::UnboundedReceiver<QueueMessage>) {
    info!("Message dispatcher started");
    while let Some(message) = rx.recv().await {
        let worker_state = state.clone();
        let handle = tokio::task::spawn_blocking(move || handle_message(&worker_state, &message));
        if let Err(e) = handle.await {
            error!("Message handler panicked: {}", e);
        }
    }
    info!("Message queue closed, dispatcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Role};
    use crate::datapoints::{assembled_data_manager, data_manager, data_point_manager};
    use crate::qa::qa_review_manager;
    use crate::testing::{self, sfdr_dataset, uploaded_equity, COMPANY_ID, REPORTING_PERIOD};
    use common::model::dataset::StorableDataset;
    use common::model::qa::QaStatus;

    fn sfdr_upload() -> StorableDataset {
        StorableDataset {
            company_id: COMPANY_ID.to_string(),
            data_type: "sfdr".to_string(),
            uploader_user_id: "uploader".to_string(),
            upload_time: 1,
            reporting_period: REPORTING_PERIOD.to_string(),
            data: sfdr_dataset().to_string(),
        }
    }

    #[test]
    fn uploaded_dataset_flows_through_qa_into_the_meta_information() {
        let mut setup = testing::setup();
        let meta = setup
            .state
            .transaction(|ctx| assembled_data_manager::store_dataset(ctx, &sfdr_upload(), false, "c"))
            .unwrap();
        process_pending(&setup.state, &mut setup.rx);
        let pending = setup
            .state
            .read(|ctx| data_manager::get_dataset_meta_information(ctx, &meta.data_id))
            .unwrap();
        assert_eq!(pending.qa_status, QaStatus::Pending);
        assert!(!pending.currently_active);

        let reviewer = AuthenticatedUser::new("reviewer", &[Role::Reviewer]);
        setup
            .state
            .transaction(|ctx| {
                qa_review_manager::assign_quality_status(
                    ctx,
                    &meta.data_id,
                    QaStatus::Accepted,
                    None,
                    &reviewer,
                    "c",
                )
            })
            .unwrap();
        process_pending(&setup.state, &mut setup.rx);
        let accepted = setup
            .state
            .read(|ctx| data_manager::get_dataset_meta_information(ctx, &meta.data_id))
            .unwrap();
        assert_eq!(accepted.qa_status, QaStatus::Accepted);
        assert!(accepted.currently_active);
        let points = setup
            .state
            .read(|ctx| assembled_data_manager::get_data_points_of_dataset(ctx, &meta.data_id))
            .unwrap();
        for data_point_id in points.values() {
            let point = setup
                .state
                .read(|ctx| data_point_manager::get_meta_information(ctx, data_point_id))
                .unwrap();
            assert_eq!(point.qa_status, QaStatus::Accepted);
            assert!(point.currently_active);
        }
        assert!(setup
            .state
            .read(|ctx| dead_letters::find_all(ctx.conn))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn accepting_a_newer_upload_moves_the_active_flag() {
        let mut setup = testing::setup();
        let user = AuthenticatedUser::new("reviewer", &[Role::Reviewer]);
        let first = setup
            .state
            .transaction(|ctx| data_point_manager::process_data_point(ctx, &uploaded_equity("1"), &user, true, "c"))
            .unwrap();
        process_pending(&setup.state, &mut setup.rx);
        let second = setup
            .state
            .transaction(|ctx| data_point_manager::process_data_point(ctx, &uploaded_equity("2"), &user, true, "c"))
            .unwrap();
        process_pending(&setup.state, &mut setup.rx);

        let old = setup
            .state
            .read(|ctx| data_point_manager::get_meta_information(ctx, &first.data_point_id))
            .unwrap();
        let new = setup
            .state
            .read(|ctx| data_point_manager::get_meta_information(ctx, &second.data_point_id))
            .unwrap();
        assert!(!old.currently_active);
        assert!(new.currently_active);
    }

    #[test]
    fn unroutable_message_becomes_a_dead_letter() {
        let setup = testing::setup();
        let message = QueueMessage {
            message_type: "Unknown".to_string(),
            correlation_id: "c".to_string(),
            routing_key: "nowhere".to_string(),
            payload: "{}".to_string(),
        };
        assert!(!handle_message(&setup.state, &message));
        let letters = setup
            .state
            .read(|ctx| dead_letters::find_all(ctx.conn))
            .unwrap();
        assert_eq!(letters.len(), 1);
        assert_eq!(letters[0].message, message);
    }
}
