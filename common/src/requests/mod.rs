use crate::model::company::CompanyInformation;
use crate::model::qa::{AcceptedDataPointSource, DatasetReviewState, QaStatus};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
/// Query of the dataset and data point upload endpoints.
pub struct BypassQaQuery {
    #[serde(default)]
    pub bypass_qa: bool,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
/// Filters and paging of the QA review queues.
pub struct QaQueueQuery {
    /// Comma-separated list.
    pub data_types: Option<String>,
    /// Comma-separated list.
    pub reporting_periods: Option<String>,
    pub company_name: Option<String>,
    pub chunk_size: Option<usize>,
    pub chunk_index: Option<usize>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AssignQaStatusQuery {
    pub qa_status: QaStatus,
    pub comment: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DataPointQaStatusPatch {
    pub qa_status: QaStatus,
    pub comment: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct QaReportStatusPatch {
    pub active: bool,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct QaReportFilter {
    #[serde(default)]
    pub show_inactive: bool,
    pub reporter_user_id: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStateQuery {
    pub review_state: DatasetReviewState,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedSourcePatch {
    pub data_point_type: String,
    pub accepted_source: AcceptedDataPointSource,
    pub company_id_of_accepted_qa_report: Option<String>,
    pub custom_value: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DataPointSearchQuery {
    pub company_id: Option<String>,
    pub data_point_type: Option<String>,
    pub reporting_period: Option<String>,
    pub qa_status: Option<QaStatus>,
    #[serde(default)]
    pub show_only_active: bool,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
/// Filters and paging of the data point QA review queue.
pub struct DataPointQaQueueQuery {
    pub company_id: Option<String>,
    pub data_point_type: Option<String>,
    pub reporting_period: Option<String>,
    pub qa_status: Option<QaStatus>,
    pub chunk_size: Option<usize>,
    pub chunk_index: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    /// `csv` or `json`; defaults to `json`.
    pub format: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreditTransactionUpload {
    pub amount: Decimal,
    pub reason: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CompanyUpload {
    pub company_name: String,
    pub headquarters: Option<String>,
}

impl CompanyUpload {
    pub fn into_company(self, company_id: String) -> CompanyInformation {
        CompanyInformation {
            company_id,
            company_name: self.company_name,
            headquarters: self.headquarters,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRoleQuery {
    pub user_id: Option<String>,
    pub company_id: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetaDataSearchQuery {
    pub company_id: Option<String>,
    pub data_type: Option<String>,
    pub reporting_period: Option<String>,
    #[serde(default)]
    pub show_only_active: bool,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploaderPatchQuery {
    pub uploader_user_id: String,
}
