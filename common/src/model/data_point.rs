//! Data point envelopes and their metadata.
//!
//! A single generic record, `ExtendedDataPoint<T>`, stands in for the base, extended and
//! currency flavours of a data point: fields a flavour does not use are simply `None`.

use crate::model::document::ExtendedDocumentReference;
use crate::model::qa::QaStatus;
use crate::model::quality::QualityOptions;
use crate::validation::{ValidationError, value_quality};
use serde::{Deserialize, Serialize};

/// Value envelope used throughout framework datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedDataPoint<T> {
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<ExtendedDocumentReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl<T> Default for ExtendedDataPoint<T> {
    fn default() -> Self {
        ExtendedDataPoint {
            value: None,
            quality: None,
            comment: None,
            data_source: None,
            currency: None,
        }
    }
}

impl<T> ExtendedDataPoint<T> {
    /// Builds a data point, rejecting value/quality combinations that cannot occur together.
    pub fn try_new(
        value: Option<T>,
        quality: Option<QualityOptions>,
        comment: Option<String>,
        data_source: Option<ExtendedDocumentReference>,
    ) -> Result<Self, ValidationError> {
        value_quality::validate(value.is_some(), quality)?;
        Ok(ExtendedDataPoint {
            value,
            quality,
            comment,
            data_source,
            currency: None,
        })
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Sum-type view of the value/quality pair.
    pub fn as_value(&self) -> DataPointValue<'_, T> {
        match &self.value {
            Some(value) => DataPointValue::Present(value, self.quality),
            None => DataPointValue::Absent(self.quality),
        }
    }

    pub fn is_consistent(&self) -> bool {
        value_quality::is_valid(self.value.is_some(), self.quality)
    }
}

/// Either a disclosed value with its quality, or the absence of one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DataPointValue<'a, T> {
    Present(&'a T, Option<QualityOptions>),
    Absent(Option<QualityOptions>),
}

/// Value with an optional source, without quality or comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseDataPoint<T> {
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<ExtendedDocumentReference>,
}

/// A single data point as sent by an uploader. `data_point` holds the serialized envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDataPoint {
    pub data_point: String,
    pub data_point_type: String,
    pub company_id: String,
    pub reporting_period: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPointMetaInformation {
    pub data_point_id: String,
    pub data_point_type: String,
    pub company_id: String,
    pub reporting_period: String,
    pub uploader_user_id: String,
    pub upload_time: i64,
    pub currently_active: bool,
    pub qa_status: QaStatus,
}

/// The (company, type, period) triple under which at most one data point is active.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicDataPointDimensions {
    pub company_id: String,
    pub data_point_type: String,
    pub reporting_period: String,
}

/// Data point content together with its metadata, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPointWithMetaInformation {
    pub data_point: String,
    pub meta_info: DataPointMetaInformation,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_value_requires_no_data_found_or_no_quality() {
        assert!(
            ExtendedDataPoint::<i64>::try_new(None, Some(QualityOptions::NoDataFound), None, None)
                .is_ok()
        );
        assert!(ExtendedDataPoint::<i64>::try_new(None, None, None, None).is_ok());
        assert!(
            ExtendedDataPoint::<i64>::try_new(None, Some(QualityOptions::Audited), None, None)
                .is_err()
        );
    }

    #[test]
    fn present_value_goes_with_any_quality() {
        let point =
            ExtendedDataPoint::try_new(Some(5_i64), Some(QualityOptions::NoDataFound), None, None)
                .unwrap();
        assert_eq!(point.value, Some(5));
        assert!(ExtendedDataPoint::try_new(Some(5_i64), None, None, None).is_ok());
    }

    #[test]
    fn serializes_with_camel_case_and_skips_absent_fields() {
        let point = ExtendedDataPoint::try_new(
            Some(5),
            Some(QualityOptions::Reported),
            None,
            Some(ExtendedDocumentReference {
                file_reference: "abc".to_string(),
                file_name: Some("Annual Report".to_string()),
                page: Some("3".to_string()),
                tag_name: None,
                publication_date: None,
            }),
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&point).unwrap(),
            json!({
                "value": 5,
                "quality": "Reported",
                "dataSource": {"fileReference": "abc", "fileName": "Annual Report", "page": "3"}
            })
        );
    }

    #[test]
    fn value_view_distinguishes_absent_values() {
        let point: ExtendedDataPoint<String> = ExtendedDataPoint {
            quality: Some(QualityOptions::NoDataFound),
            ..Default::default()
        };
        assert_eq!(
            point.as_value(),
            DataPointValue::Absent(Some(QualityOptions::NoDataFound))
        );
    }
}
