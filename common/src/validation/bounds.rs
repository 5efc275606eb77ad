//! Minimum/maximum checks over plain numbers and data point wrappers.
//!
//! A wrapper is unwrapped to its value before comparing; a missing value always passes.

use crate::model::data_point::{BaseDataPoint, ExtendedDataPoint};
use crate::validation::ValidationError;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// Anything that may carry a number comparable against a bound.
pub trait NumericValue {
    fn numeric_value(&self) -> Option<Decimal>;
}

macro_rules! impl_numeric_value_for_integers {
    ($($t:ty),*) => {
        $(impl NumericValue for $t {
            fn numeric_value(&self) -> Option<Decimal> {
                Some(Decimal::from(*self))
            }
        })*
    };
}

impl_numeric_value_for_integers!(i8, i16, i32, i64, u8, u16, u32, u64);

impl NumericValue for f64 {
    fn numeric_value(&self) -> Option<Decimal> {
        Decimal::from_f64(*self)
    }
}

impl NumericValue for f32 {
    fn numeric_value(&self) -> Option<Decimal> {
        Decimal::from_f32(*self)
    }
}

impl NumericValue for Decimal {
    fn numeric_value(&self) -> Option<Decimal> {
        Some(*self)
    }
}

impl<T: NumericValue> NumericValue for Option<T> {
    fn numeric_value(&self) -> Option<Decimal> {
        self.as_ref().and_then(NumericValue::numeric_value)
    }
}

impl<T: NumericValue> NumericValue for BaseDataPoint<T> {
    fn numeric_value(&self) -> Option<Decimal> {
        self.value.numeric_value()
    }
}

impl<T: NumericValue> NumericValue for ExtendedDataPoint<T> {
    fn numeric_value(&self) -> Option<Decimal> {
        self.value.numeric_value()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum(pub Decimal);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Maximum(pub Decimal);

impl Minimum {
    pub fn is_valid<V: NumericValue + ?Sized>(&self, value: &V) -> bool {
        value.numeric_value().is_none_or(|number| number >= self.0)
    }

    pub fn validate<V: NumericValue + ?Sized>(&self, value: &V) -> Result<(), ValidationError> {
        if self.is_valid(value) {
            Ok(())
        } else {
            Err(ValidationError::new(
                "value",
                format!("must be greater than or equal to {}", self.0),
            ))
        }
    }
}

impl Maximum {
    pub fn is_valid<V: NumericValue + ?Sized>(&self, value: &V) -> bool {
        value.numeric_value().is_none_or(|number| number <= self.0)
    }

    pub fn validate<V: NumericValue + ?Sized>(&self, value: &V) -> Result<(), ValidationError> {
        if self.is_valid(value) {
            Ok(())
        } else {
            Err(ValidationError::new(
                "value",
                format!("must be less than or equal to {}", self.0),
            ))
        }
    }
}
