use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInformation {
    pub company_id: String,
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<String>,
}

/// Role a user holds within a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanyRole {
    CompanyOwner,
    CompanyAdmin,
    Member,
    DataUploader,
}

impl CompanyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyRole::CompanyOwner => "CompanyOwner",
            CompanyRole::CompanyAdmin => "CompanyAdmin",
            CompanyRole::Member => "Member",
            CompanyRole::DataUploader => "DataUploader",
        }
    }

    pub fn parse(value: &str) -> Option<CompanyRole> {
        match value {
            "CompanyOwner" => Some(CompanyRole::CompanyOwner),
            "CompanyAdmin" => Some(CompanyRole::CompanyAdmin),
            "Member" => Some(CompanyRole::Member),
            "DataUploader" => Some(CompanyRole::DataUploader),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRoleAssignment {
    pub company_role: CompanyRole,
    pub company_id: String,
    pub user_id: String,
}
