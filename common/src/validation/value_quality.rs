use crate::model::quality::QualityOptions;
use crate::validation::ValidationError;

/// A missing value is only allowed when quality is absent or `NoDataFound`. A present value
/// goes with any quality.
pub fn is_valid(has_value: bool, quality: Option<QualityOptions>) -> bool {
    has_value || matches!(quality, None | Some(QualityOptions::NoDataFound))
}

pub fn validate(has_value: bool, quality: Option<QualityOptions>) -> Result<(), ValidationError> {
    if is_valid(has_value, quality) {
        return Ok(());
    }
    Err(ValidationError::new(
        "quality",
        format!(
            "a missing value requires quality NoDataFound, got {:?}",
            quality.unwrap_or(QualityOptions::NoDataFound)
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_value_combinations() {
        assert!(is_valid(false, None));
        assert!(is_valid(false, Some(QualityOptions::NoDataFound)));
        assert!(!is_valid(false, Some(QualityOptions::Estimated)));
    }

    #[test]
    fn present_value_combinations() {
        assert!(is_valid(true, None));
        assert!(is_valid(true, Some(QualityOptions::Audited)));
        assert!(is_valid(true, Some(QualityOptions::NoDataFound)));
        assert!(validate(true, Some(QualityOptions::NoDataFound)).is_ok());
        assert!(validate(false, Some(QualityOptions::Reported)).is_err());
    }
}
