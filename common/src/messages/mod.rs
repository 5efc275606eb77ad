//! Message queue envelope and payloads.
//!
//! Every message travels as a `QueueMessage`: a type tag, the correlation id of the request that
//! caused it, a routing key selecting the listeners, and a JSON payload. Listeners check the type
//! tag before decoding the payload and reject messages whose type they do not handle.

use crate::model::qa::QaStatus;
use serde::{Deserialize, Serialize};

/// Values of `QueueMessage::message_type`.
pub struct MessageType;

impl MessageType {
    pub const DATA_POINT_UPLOADED: &'static str = "Data Point Uploaded";
    pub const DATASET_QA_REQUIRED: &'static str = "Dataset QA Required";
    pub const DATASET_UPLOADED: &'static str = "Dataset Uploaded";
    pub const QA_STATUS_CHANGED: &'static str = "QA Status Changed";
    pub const DATA_POINT_QA_STATUS_CHANGED: &'static str = "Data Point QA Status Changed";
    pub const QA_COMPLETED: &'static str = "QA Completed";
    pub const REQUEST_SET_TO_PROCESSING: &'static str = "Request Set To Processing";
}

/// Values of `QueueMessage::routing_key`.
pub struct RoutingKeys;

impl RoutingKeys {
    pub const DATA_POINT_UPLOAD: &'static str = "dataPointUpload";
    pub const DATASET_UPLOAD: &'static str = "datasetUpload";
    pub const QA_STATUS_CHANGE: &'static str = "qaStatusChange";
    pub const DATA_POINT_QA_STATUS_CHANGE: &'static str = "dataPointQaStatusChange";
    pub const QA_COMPLETED: &'static str = "qaCompleted";
    pub const DATA_SOURCING_PROCESSING: &'static str = "dataSourcingProcessing";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueMessage {
    pub message_type: String,
    pub correlation_id: String,
    pub routing_key: String,
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPointUploadedPayload {
    pub data_point_id: String,
    pub company_id: String,
    pub data_point_type: String,
    pub reporting_period: String,
    pub bypass_qa: bool,
    pub uploader_user_id: String,
    pub upload_time: i64,
}

/// Payload of both `DATASET_QA_REQUIRED` and `DATASET_UPLOADED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetUploadedPayload {
    pub data_id: String,
    pub bypass_qa: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaStatusChangeMessage {
    pub data_id: String,
    pub updated_qa_status: QaStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currently_active_data_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPointQaStatusChangeMessage {
    pub data_point_id: String,
    pub updated_qa_status: QaStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currently_active_data_point_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaCompletedMessage {
    pub identifier: String,
    pub validation_result: QaStatus,
    pub reviewer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSetToProcessingMessage {
    pub data_sourcing_id: String,
    pub requested_company_id: String,
    pub requested_reporting_period: String,
    pub requested_framework: String,
    pub triggering_user_id: String,
}
