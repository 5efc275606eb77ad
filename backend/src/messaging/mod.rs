//! In-process message queue.
//!
//! Producers (the data managers and QA services) publish `QueueMessage`s through a
//! `MessageQueuePublications` handle; a single long-running dispatcher task, started in `main.rs`,
//! receives them from the channel and hands each to the listeners bound to its routing key.
//!
//! - `MessageQueuePublications`: cloneable producer handle wrapping an unbounded MPSC sender.
//!   Publishing never blocks, so synchronous manager code can publish directly.
//! - `Outbox`: the receiving half of a buffered handle. Work running inside a database transaction
//!   publishes into an outbox, which is flushed to the real queue only after the commit.
//! - `dispatcher`: routing of received messages to listeners, and dead-lettering of rejected ones.

pub mod dispatcher;

use crate::error::ApiError;
use common::messages::{
    DataPointQaStatusChangeMessage, DataPointUploadedPayload, DatasetUploadedPayload, MessageType,
    QaCompletedMessage, QaStatusChangeMessage, QueueMessage, RoutingKeys,
};
use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;

/// Producer handle of the message queue.
#[derive(Clone)]
pub struct MessageQueuePublications {
    tx: mpsc::UnboundedSender<QueueMessage>,
}

/// Messages held back until the surrounding transaction has committed.
pub struct Outbox {
    rx: mpsc::UnboundedReceiver<QueueMessage>,
}

impl Outbox {
    /// Forwards every buffered message to `queue`, in publication order.
    pub fn flush(&mut self, queue: &MessageQueuePublications) -> Result<usize, ApiError> {
        let mut forwarded = 0;
        while let Ok(message) = self.rx.try_recv() {
            queue.send(message)?;
            forwarded += 1;
        }
        Ok(forwarded)
    }

    /// Drops every buffered message.
    pub fn discard(&mut self) -> usize {
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}

impl MessageQueuePublications {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<QueueMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (MessageQueuePublications { tx }, rx)
    }

    /// A handle whose messages stay in the returned `Outbox` until flushed.
    pub fn buffered() -> (Self, Outbox) {
        let (queue, rx) = MessageQueuePublications::new();
        (queue, Outbox { rx })
    }

    pub fn send(&self, message: QueueMessage) -> Result<(), ApiError> {
        self.tx.send(message).map_err(|e| {
            error!("Message queue is closed, dropping message of type '{}'", e.0.message_type);
            ApiError::QueueUnavailable(e.0.message_type)
        })
    }

    pub fn publish<T: Serialize>(
        &self,
        payload: &T,
        message_type: &str,
        correlation_id: &str,
        routing_key: &str,
    ) -> Result<(), ApiError> {
        debug!(
            "Publishing message of type '{}' with routing key '{}' (correlation ID: {})",
            message_type, routing_key, correlation_id
        );
        self.send(QueueMessage {
            message_type: message_type.to_string(),
            correlation_id: correlation_id.to_string(),
            routing_key: routing_key.to_string(),
            payload: serde_json::to_string(payload)?,
        })
    }

    pub fn publish_data_point_uploaded(
        &self,
        payload: &DataPointUploadedPayload,
        correlation_id: &str,
    ) -> Result<(), ApiError> {
        self.publish(
            payload,
            MessageType::DATA_POINT_UPLOADED,
            correlation_id,
            RoutingKeys::DATA_POINT_UPLOAD,
        )
    }

    pub fn publish_dataset_qa_required(
        &self,
        data_id: &str,
        bypass_qa: bool,
        correlation_id: &str,
    ) -> Result<(), ApiError> {
        self.publish(
            &DatasetUploadedPayload {
                data_id: data_id.to_string(),
                bypass_qa,
            },
            MessageType::DATASET_QA_REQUIRED,
            correlation_id,
            RoutingKeys::DATASET_UPLOAD,
        )
    }

    pub fn publish_dataset_uploaded(
        &self,
        data_id: &str,
        bypass_qa: bool,
        correlation_id: &str,
    ) -> Result<(), ApiError> {
        self.publish(
            &DatasetUploadedPayload {
                data_id: data_id.to_string(),
                bypass_qa,
            },
            MessageType::DATASET_UPLOADED,
            correlation_id,
            RoutingKeys::DATASET_UPLOAD,
        )
    }

    pub fn publish_qa_status_changed(
        &self,
        message: &QaStatusChangeMessage,
        correlation_id: &str,
    ) -> Result<(), ApiError> {
        self.publish(
            message,
            MessageType::QA_STATUS_CHANGED,
            correlation_id,
            RoutingKeys::QA_STATUS_CHANGE,
        )
    }

    pub fn publish_data_point_qa_status_changed(
        &self,
        message: &DataPointQaStatusChangeMessage,
        correlation_id: &str,
    ) -> Result<(), ApiError> {
        self.publish(
            message,
            MessageType::DATA_POINT_QA_STATUS_CHANGED,
            correlation_id,
            RoutingKeys::DATA_POINT_QA_STATUS_CHANGE,
        )
    }

    pub fn publish_qa_completed(
        &self,
        message: &QaCompletedMessage,
        correlation_id: &str,
    ) -> Result<(), ApiError> {
        self.publish(
            message,
            MessageType::QA_COMPLETED,
            correlation_id,
            RoutingKeys::QA_COMPLETED,
        )
    }
}

/// Rejects a message whose type tag differs from the one the listener handles.
pub fn validate_message_type(message: &QueueMessage, expected: &[&str]) -> Result<(), ApiError> {
    if expected.contains(&message.message_type.as_str()) {
        Ok(())
    } else {
        Err(ApiError::MessageQueueReject(format!(
            "Message was rejected: expected type {:?} but received '{}'",
            expected, message.message_type
        )))
    }
}

/// Decodes the payload, rejecting the message if it does not parse.
pub fn read_payload<T: DeserializeOwned>(message: &QueueMessage) -> Result<T, ApiError> {
    serde_json::from_str(&message.payload).map_err(|e| {
        ApiError::MessageQueueReject(format!("Message payload could not be read: {}", e))
    })
}

#[cfg(test)]
pub(crate) fn drain(rx: &mut mpsc::UnboundedReceiver<QueueMessage>) -> Vec<QueueMessage> {
    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        messages.push(message);
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbox_forwards_only_on_flush() {
        let (queue, mut rx) = MessageQueuePublications::new();
        let (buffered, mut outbox) = MessageQueuePublications::buffered();
        buffered.publish_dataset_uploaded("data-1", false, "corr").unwrap();
        assert!(drain(&mut rx).is_empty());

        assert_eq!(outbox.flush(&queue).unwrap(), 1);
        let messages = drain(&mut rx);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_type, MessageType::DATASET_UPLOADED);
        assert_eq!(messages[0].routing_key, RoutingKeys::DATASET_UPLOAD);
        let payload: DatasetUploadedPayload = read_payload(&messages[0]).unwrap();
        assert_eq!(payload.data_id, "data-1");
    }

    #[test]
    fn wrong_message_type_is_rejected() {
        let message = QueueMessage {
            message_type: "Something Else".to_string(),
            correlation_id: "c".to_string(),
            routing_key: RoutingKeys::DATASET_UPLOAD.to_string(),
            payload: "{}".to_string(),
        };
        assert!(matches!(
            validate_message_type(&message, &[MessageType::DATASET_UPLOADED]),
            Err(ApiError::MessageQueueReject(_))
        ));
    }

    #[test]
    fn publishing_into_a_closed_queue_fails() {
        let (queue, rx) = MessageQueuePublications::new();
        drop(rx);
        assert!(matches!(
            queue.publish_dataset_uploaded("d", false, "c"),
            Err(ApiError::QueueUnavailable(_))
        ));
    }
}
