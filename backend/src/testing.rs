//! Fixtures shared by the unit tests.

use crate::messaging::MessageQueuePublications;
use crate::specification::{
    BaseType, Constraints, DataPointTypeSpecification, FrameworkSpecification, SpecificationRegistry,
};
use crate::state::AppState;
use crate::storage::{companies, Database};
use common::messages::QueueMessage;
use common::model::company::CompanyInformation;
use common::model::data_point::UploadedDataPoint;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

pub const COMPANY_ID: &str = "company-1";
pub const COMPANY_NAME: &str = "Test Company AG";
pub const REPORTING_PERIOD: &str = "2023";

pub struct TestSetup {
    pub state: AppState,
    pub rx: UnboundedReceiver<QueueMessage>,
}

fn data_point_type(id: &str, base_type: BaseType, minimum: Option<Decimal>) -> DataPointTypeSpecification {
    DataPointTypeSpecification {
        id: id.to_string(),
        name: id.to_string(),
        base_type,
        constraints: Constraints {
            minimum,
            ..Default::default()
        },
    }
}

pub fn sfdr_schema() -> Value {
    json!({
        "general": {
            "general": {
                "fiscalYearEnd": {"id": "plainFiscalYearEnd", "ref": "https://example.org/fiscal-year-end"},
                "dataDate": {"id": "plainDateDataDate", "ref": "https://example.org/data-date"}
            },
            "financialInformation": {
                "equity": {"id": "extendedCurrencyEquity", "ref": "https://example.org/equity"},
                "numberOfEmployees": {"id": "extendedIntegerNumberOfEmployees", "ref": "https://example.org/employees"}
            }
        }
    })
}

pub fn registry() -> SpecificationRegistry {
    let mut registry = SpecificationRegistry::new();
    registry.insert_framework(FrameworkSpecification {
        id: "sfdr".to_string(),
        name: "SFDR".to_string(),
        schema: sfdr_schema(),
        referenced_report_json_path: Some("general.general.referencedReports".to_string()),
    });
    registry.insert_data_point_type(data_point_type("plainFiscalYearEnd", BaseType::PlainFiscalYearEnd, None));
    registry.insert_data_point_type(data_point_type("plainDateDataDate", BaseType::PlainDate, None));
    registry.insert_data_point_type(data_point_type(
        "extendedCurrencyEquity",
        BaseType::ExtendedCurrency,
        Some(Decimal::ZERO),
    ));
    registry.insert_data_point_type(data_point_type(
        "extendedIntegerNumberOfEmployees",
        BaseType::ExtendedInteger,
        Some(Decimal::ZERO),
    ));
    registry
}

pub fn setup() -> TestSetup {
    let database = Database::in_memory().unwrap();
    database
        .with_connection(|conn| {
            companies::save_company(
                conn,
                &CompanyInformation {
                    company_id: COMPANY_ID.to_string(),
                    company_name: COMPANY_NAME.to_string(),
                    headquarters: None,
                },
            )
        })
        .unwrap();
    let (queue, rx) = MessageQueuePublications::new();
    TestSetup {
        state: AppState::new(database, Arc::new(registry()), queue),
        rx,
    }
}

pub fn uploaded_equity(value: &str) -> UploadedDataPoint {
    UploadedDataPoint {
        data_point: format!(r#"{{"value": {value}, "currency": "EUR", "quality": "Reported"}}"#),
        data_point_type: "extendedCurrencyEquity".to_string(),
        company_id: COMPANY_ID.to_string(),
        reporting_period: REPORTING_PERIOD.to_string(),
    }
}

/// A complete SFDR dataset citing two reports.
pub fn sfdr_dataset() -> Value {
    json!({
        "general": {
            "general": {
                "fiscalYearEnd": "31-Dec",
                "dataDate": "2023-12-31",
                "referencedReports": {
                    "AnnualReport": {"fileReference": "ref-annual", "fileName": "AnnualReport", "publicationDate": "2024-03-01"},
                    "ESGReport": {"fileReference": "ref-esg", "fileName": "ESGReport"}
                }
            },
            "financialInformation": {
                "equity": {
                    "value": 1500000, "currency": "EUR", "quality": "Audited",
                    "dataSource": {"fileReference": "ref-annual", "page": "12"}
                },
                "numberOfEmployees": {
                    "value": 230, "quality": "Reported",
                    "dataSource": {"fileReference": "ref-esg", "page": "3-4"}
                }
            }
        }
    })
}
