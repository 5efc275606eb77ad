//! QA review and dataset review DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Review outcome of a data point or dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QaStatus {
    Pending,
    Accepted,
    Rejected,
}

impl QaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QaStatus::Pending => "Pending",
            QaStatus::Accepted => "Accepted",
            QaStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(value: &str) -> Option<QaStatus> {
        match value {
            "Pending" => Some(QaStatus::Pending),
            "Accepted" => Some(QaStatus::Accepted),
            "Rejected" => Some(QaStatus::Rejected),
            _ => None,
        }
    }
}

/// Verdict a reviewer gives in a data point QA report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QaReportDataPointVerdict {
    QaAccepted,
    QaRejected,
    QaInconclusive,
    QaNotAttempted,
}

impl QaReportDataPointVerdict {
    /// Status the reviewed data point moves to, if the verdict is conclusive.
    pub fn to_qa_status(self) -> Option<QaStatus> {
        match self {
            QaReportDataPointVerdict::QaAccepted => Some(QaStatus::Accepted),
            QaReportDataPointVerdict::QaRejected => Some(QaStatus::Rejected),
            QaReportDataPointVerdict::QaInconclusive | QaReportDataPointVerdict::QaNotAttempted => {
                None
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QaReportDataPointVerdict::QaAccepted => "QaAccepted",
            QaReportDataPointVerdict::QaRejected => "QaRejected",
            QaReportDataPointVerdict::QaInconclusive => "QaInconclusive",
            QaReportDataPointVerdict::QaNotAttempted => "QaNotAttempted",
        }
    }

    pub fn parse(value: &str) -> Option<QaReportDataPointVerdict> {
        match value {
            "QaAccepted" => Some(QaReportDataPointVerdict::QaAccepted),
            "QaRejected" => Some(QaReportDataPointVerdict::QaRejected),
            "QaInconclusive" => Some(QaReportDataPointVerdict::QaInconclusive),
            "QaNotAttempted" => Some(QaReportDataPointVerdict::QaNotAttempted),
            _ => None,
        }
    }
}

/// Body of a data point QA report as posted by a reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaReportDataPoint {
    #[serde(default)]
    pub comment: String,
    pub verdict: QaReportDataPointVerdict,
    /// Serialized data point envelope proposed instead of the uploaded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_data: Option<String>,
}

/// A stored data point QA report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPointQaReport {
    pub qa_report_id: String,
    pub data_point_id: String,
    pub data_point_type: String,
    pub reporter_user_id: String,
    pub upload_time: i64,
    pub active: bool,
    pub comment: String,
    pub verdict: QaReportDataPointVerdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_data: Option<String>,
}

/// Metadata of a stored dataset QA report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaReportMetaInformation {
    pub qa_report_id: String,
    pub data_id: String,
    pub data_type: String,
    pub reporter_user_id: String,
    pub upload_time: i64,
    pub active: bool,
    /// Data point QA reports the report was split into. Empty for monolithic datasets.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_point_qa_report_ids: Vec<String>,
}

/// A stored dataset QA report: metadata plus the opaque report document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaReportWithMetaInformation {
    pub meta_info: QaReportMetaInformation,
    pub report: Value,
}

/// One entry of the dataset QA review log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaReviewResponse {
    pub data_id: String,
    pub company_id: String,
    pub company_name: String,
    pub framework: String,
    pub reporting_period: String,
    pub timestamp: i64,
    pub qa_status: QaStatus,
    pub triggering_user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// One entry of the data point QA review log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPointQaReviewInformation {
    pub data_point_id: String,
    pub company_id: String,
    pub company_name: String,
    pub data_point_type: String,
    pub reporting_period: String,
    pub timestamp: i64,
    pub qa_status: QaStatus,
    pub triggering_user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Lifecycle of an aggregate dataset review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetReviewState {
    Pending,
    Finished,
    Aborted,
}

impl DatasetReviewState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetReviewState::Pending => "Pending",
            DatasetReviewState::Finished => "Finished",
            DatasetReviewState::Aborted => "Aborted",
        }
    }

    pub fn parse(value: &str) -> Option<DatasetReviewState> {
        match value {
            "Pending" => Some(DatasetReviewState::Pending),
            "Finished" => Some(DatasetReviewState::Finished),
            "Aborted" => Some(DatasetReviewState::Aborted),
            _ => None,
        }
    }
}

/// Which value a dataset review settles on for one data point type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcceptedDataPointSource {
    Original,
    Qa,
    Custom,
}

/// A QA report as seen from a dataset review, with the reporter's company attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaReportDataPointWithReporterDetails {
    pub qa_report_id: String,
    pub verdict: QaReportDataPointVerdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_data: Option<String>,
    pub reporter_user_id: String,
    pub reporter_company_id: String,
    pub reporter_company_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPointReviewDetails {
    pub data_point_type: String,
    pub data_point_id: String,
    pub qa_reports: Vec<QaReportDataPointWithReporterDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_source: Option<AcceptedDataPointSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id_of_accepted_qa_report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetReviewResponse {
    pub dataset_review_id: String,
    pub dataset_id: String,
    pub company_id: String,
    pub data_type: String,
    pub reporting_period: String,
    pub review_state: DatasetReviewState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_user_name: Option<String>,
    pub data_points: Vec<DataPointReviewDetails>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_conclusive_verdicts_change_status() {
        assert_eq!(
            QaReportDataPointVerdict::QaAccepted.to_qa_status(),
            Some(QaStatus::Accepted)
        );
        assert_eq!(
            QaReportDataPointVerdict::QaRejected.to_qa_status(),
            Some(QaStatus::Rejected)
        );
        assert_eq!(QaReportDataPointVerdict::QaInconclusive.to_qa_status(), None);
        assert_eq!(QaReportDataPointVerdict::QaNotAttempted.to_qa_status(), None);
    }

    #[test]
    fn status_strings_round_trip_through_storage_form() {
        for status in [QaStatus::Pending, QaStatus::Accepted, QaStatus::Rejected] {
            assert_eq!(QaStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(QaStatus::parse("accepted"), None);
    }
}
