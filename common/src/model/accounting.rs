use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Credits granted to a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTransaction {
    pub transaction_id: String,
    pub company_id: String,
    pub amount: Decimal,
    pub reason: String,
    pub triggering_user_id: String,
    pub timestamp: i64,
}

/// Credits consumed by a data sourcing request that a company's member put into processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BilledRequest {
    pub billed_company_id: String,
    pub data_sourcing_id: String,
    pub requested_company_id: String,
    pub requested_reporting_period: String,
    pub requested_framework: String,
    pub debt: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub company_id: String,
    pub balance: Decimal,
}
