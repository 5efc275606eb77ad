//! Field validators applied to uploaded data.
//!
//! Every validator is a stateless predicate. `None` inputs are valid throughout; requiring a
//! field is the caller's concern, not the validator's.

pub mod bounds;
pub mod currency;
pub mod data_type;
pub mod fiscal_year_end;
pub mod page_range;
pub mod value_quality;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}
