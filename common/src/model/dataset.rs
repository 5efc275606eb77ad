use crate::model::qa::QaStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upload body for a framework dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyAssociatedData {
    pub company_id: String,
    pub reporting_period: String,
    pub data: Value,
}

/// A dataset ready to be persisted; `data` is the serialized framework document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorableDataset {
    pub company_id: String,
    pub data_type: String,
    pub uploader_user_id: String,
    pub upload_time: i64,
    pub reporting_period: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataMetaInformation {
    pub data_id: String,
    pub company_id: String,
    pub data_type: String,
    pub uploader_user_id: String,
    pub upload_time: i64,
    pub reporting_period: String,
    pub currently_active: bool,
    pub qa_status: QaStatus,
}

/// Response of a dataset upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataMetaInformationResponse {
    pub data_id: String,
    pub company_id: String,
    pub data_type: String,
    pub reporting_period: String,
}
