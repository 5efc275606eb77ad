use serde::{Deserialize, Serialize};

/// Points a data point at the page of a stored document it was taken from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedDocumentReference {
    pub file_reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
}

/// A report listed once per dataset under `referencedReports`, keyed by its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyReport {
    pub file_reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
}

impl CompanyReport {
    /// Name under which the report appears in the `referencedReports` map.
    pub fn key(&self) -> &str {
        self.file_name.as_deref().unwrap_or(&self.file_reference)
    }
}

impl From<&ExtendedDocumentReference> for CompanyReport {
    fn from(source: &ExtendedDocumentReference) -> Self {
        CompanyReport {
            file_reference: source.file_reference.clone(),
            file_name: source.file_name.clone(),
            publication_date: source.publication_date.clone(),
        }
    }
}

/// Stored document metadata returned after an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUploadResponse {
    pub document_id: String,
    pub file_name: String,
}
