//! Content validation of single data points against their type specification.

use crate::error::ApiError;
use crate::specification::json_specification::DehydratedLeaf;
use crate::specification::{BaseType, Constraints, DataPointTypeSpecification, SpecificationClient};
use chrono::NaiveDate;
use common::model::data_point::ExtendedDataPoint;
use common::model::document::CompanyReport;
use common::validation::bounds::{Maximum, Minimum};
use common::validation::{currency, fiscal_year_end, page_range, ValidationError};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

const YES_NO: [&str; 2] = ["Yes", "No"];

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::new(field, message)
}

fn decimal_of(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn check_bounds(field: &str, number: Decimal, constraints: &Constraints) -> Result<(), ValidationError> {
    if let Some(minimum) = constraints.minimum {
        Minimum(minimum).validate(&number).map_err(|e| invalid(field, e.message))?;
    }
    if let Some(maximum) = constraints.maximum {
        Maximum(maximum).validate(&number).map_err(|e| invalid(field, e.message))?;
    }
    Ok(())
}

fn check_decimal(field: &str, value: &Value, constraints: &Constraints) -> Result<(), ValidationError> {
    let number = decimal_of(value).ok_or_else(|| invalid(field, format!("'{value}' is not a number")))?;
    check_bounds(field, number, constraints)
}

fn check_integer(field: &str, value: &Value, constraints: &Constraints) -> Result<(), ValidationError> {
    let Some(number) = value.as_i64() else {
        return Err(invalid(field, format!("'{value}' is not an integer")));
    };
    check_bounds(field, Decimal::from(number), constraints)
}

fn check_text<'v>(field: &str, value: &'v Value) -> Result<&'v str, ValidationError> {
    value
        .as_str()
        .ok_or_else(|| invalid(field, format!("'{value}' is not a string")))
}

fn check_date(field: &str, value: &Value) -> Result<(), ValidationError> {
    let text = check_text(field, value)?;
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| invalid(field, format!("'{text}' is not a date of the form YYYY-MM-DD")))
}

fn check_enum(field: &str, value: &Value, constraints: &Constraints) -> Result<(), ValidationError> {
    let text = check_text(field, value)?;
    match &constraints.allowed_values {
        Some(allowed) if !allowed.iter().any(|option| option == text) => Err(invalid(
            field,
            format!("'{text}' is not one of {}", allowed.join(", ")),
        )),
        _ => Ok(()),
    }
}

fn check_yes_no(field: &str, value: &Value) -> Result<(), ValidationError> {
    let text = check_text(field, value)?;
    if YES_NO.contains(&text) {
        Ok(())
    } else {
        Err(invalid(field, format!("'{text}' is neither Yes nor No")))
    }
}

fn check_extended(
    spec: &DataPointTypeSpecification,
    content: &Value,
) -> Result<(), ValidationError> {
    let field = spec.id.as_str();
    let data_point: ExtendedDataPoint<Value> = serde_json::from_value(content.clone())
        .map_err(|e| invalid(field, format!("not a data point: {e}")))?;
    let value = data_point.value.as_ref().filter(|value| !value.is_null());
    if !common::validation::value_quality::is_valid(value.is_some(), data_point.quality) {
        return Err(invalid(
            field,
            "a value must be given unless the quality is NoDataFound",
        ));
    }
    if let Some(source) = &data_point.data_source {
        page_range::validate(source.page.as_deref()).map_err(|e| invalid(field, e.message))?;
        if let Some(date) = &source.publication_date {
            check_date(field, &Value::String(date.clone()))?;
        }
    }
    if spec.base_type == BaseType::ExtendedCurrency {
        currency::validate(data_point.currency.as_deref()).map_err(|e| invalid(field, e.message))?;
    }
    let Some(value) = value else {
        return Ok(());
    };
    match spec.base_type {
        BaseType::ExtendedDecimal | BaseType::ExtendedCurrency => {
            check_decimal(field, value, &spec.constraints)
        }
        BaseType::ExtendedInteger => check_integer(field, value, &spec.constraints),
        BaseType::ExtendedEnum => check_enum(field, value, &spec.constraints),
        BaseType::ExtendedDate => check_date(field, value),
        BaseType::ExtendedYesNo => check_yes_no(field, value),
        _ => check_text(field, value).map(|_| ()),
    }
}

/// Checks `content` against the base type and constraints of `spec`.
pub fn validate_content(
    spec: &DataPointTypeSpecification,
    content: &Value,
) -> Result<(), ValidationError> {
    let field = spec.id.as_str();
    if spec.base_type.is_extended() {
        return check_extended(spec, content);
    }
    match spec.base_type {
        BaseType::ExtendedReferencedReports => {
            serde_json::from_value::<BTreeMap<String, CompanyReport>>(content.clone())
                .map(|_| ())
                .map_err(|e| invalid(field, format!("not a map of referenced reports: {e}")))
        }
        BaseType::PlainString => check_text(field, content).map(|_| ()),
        BaseType::PlainDate => check_date(field, content),
        BaseType::PlainEnum => check_enum(field, content, &spec.constraints),
        BaseType::PlainInteger => check_integer(field, content, &spec.constraints),
        BaseType::PlainDecimal => check_decimal(field, content, &spec.constraints),
        BaseType::PlainYesNo => check_yes_no(field, content),
        BaseType::PlainFiscalYearEnd => {
            fiscal_year_end::validate(Some(check_text(field, content)?))
                .map_err(|e| invalid(field, e.message))
        }
        BaseType::PlainCurrency => {
            currency::validate(Some(check_text(field, content)?)).map_err(|e| invalid(field, e.message))
        }
        _ => Ok(()),
    }
}

/// Looks up the type of a data point and validates its serialized content.
pub fn validate_serialized(
    specifications: &dyn SpecificationClient,
    data_point_type: &str,
    content: &str,
) -> Result<(), ApiError> {
    let spec = specifications
        .get_data_point_type_specification(data_point_type)
        .ok_or_else(|| {
            ApiError::invalid_input(
                "Unknown data point type",
                format!("The data point type '{data_point_type}' does not exist."),
            )
        })?;
    let value: Value = serde_json::from_str(content).map_err(|e| {
        ApiError::invalid_input(
            "Invalid data point",
            format!("The content of the data point is not valid JSON: {e}"),
        )
    })?;
    Ok(validate_content(spec, &value)?)
}

/// Validates every non-empty leaf of a dataset. The error returned is the one of the first failing
/// leaf in data point type order.
pub fn validate_leaves(
    specifications: &dyn SpecificationClient,
    leaves: &BTreeMap<String, DehydratedLeaf>,
) -> Result<(), ApiError> {
    let leaves: Vec<&DehydratedLeaf> = leaves.values().filter(|leaf| !leaf.is_empty()).collect();
    let first_failure = leaves.par_iter().find_map_first(|leaf| {
        match specifications.get_data_point_type_specification(&leaf.data_point_type) {
            None => Some(ApiError::invalid_input(
                "Unknown data point type",
                format!(
                    "The data point type '{}' at '{}' does not exist.",
                    leaf.data_point_type, leaf.json_path
                ),
            )),
            Some(spec) => validate_content(spec, &leaf.content).err().map(|e| {
                ApiError::invalid_input(
                    "Validation failed",
                    format!("Invalid data at '{}': {}", leaf.json_path, e.message),
                )
            }),
        }
    });
    match first_failure {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
