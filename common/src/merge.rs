//! Helpers that fold several data points of one type into a single synthetic data point.
//!
//! Used where a framework field is derived from other fields, e.g. a total computed from its
//! components. The synthetic point never carries a data source.

use crate::model::data_point::ExtendedDataPoint;
use crate::model::quality::QualityOptions;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("value '{0}' is not numeric")]
    TypeMismatch(String),
    #[error("data point at position {0} has no value but its quality does not state NoDataFound")]
    MissingValue(usize),
}

/// Picks the lowest-confidence quality among the inputs.
///
/// An input without quality makes the result unknown, unless every quality that is present is
/// `NoDataFound`, in which case the result is `NoDataFound`.
pub fn merge_quality(qualities: &[Option<QualityOptions>]) -> Option<QualityOptions> {
    let present: Vec<QualityOptions> = qualities.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    if present.iter().all(|quality| *quality == QualityOptions::NoDataFound) {
        return Some(QualityOptions::NoDataFound);
    }
    if present.len() != qualities.len() {
        return None;
    }
    present
        .into_iter()
        .filter_map(|quality| quality.rank().map(|rank| (rank, quality)))
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, quality)| quality)
}

/// Joins the non-empty comments with `", "`.
pub fn merge_comments<I, S>(comments: I) -> Option<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let parts: Vec<String> = comments
        .into_iter()
        .flatten()
        .filter(|comment| !comment.as_ref().is_empty())
        .map(|comment| comment.as_ref().to_string())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Builds a synthetic data point whose value is `transform` applied to the input values and
/// whose quality and comment are the merged ones.
pub fn apply_transformation<T, U, F>(
    data_points: &[ExtendedDataPoint<T>],
    transform: F,
) -> Result<ExtendedDataPoint<U>, MergeError>
where
    F: FnOnce(&[Option<&T>]) -> Result<Option<U>, MergeError>,
{
    let values: Vec<Option<&T>> = data_points.iter().map(|point| point.value.as_ref()).collect();
    let qualities: Vec<Option<QualityOptions>> =
        data_points.iter().map(|point| point.quality).collect();
    Ok(ExtendedDataPoint {
        value: transform(&values)?,
        quality: merge_quality(&qualities),
        comment: merge_comments(data_points.iter().map(|point| point.comment.as_deref())),
        data_source: None,
        currency: None,
    })
}

/// Sums numeric data points. Points without a value are only tolerated when their quality is
/// `NoDataFound`.
pub fn sum_of_extended_data_points(
    data_points: &[ExtendedDataPoint<Value>],
) -> Result<ExtendedDataPoint<Decimal>, MergeError> {
    for (position, point) in data_points.iter().enumerate() {
        if point.value.is_none() && point.quality != Some(QualityOptions::NoDataFound) {
            return Err(MergeError::MissingValue(position));
        }
    }
    apply_transformation(data_points, |values| {
        let mut sum: Option<Decimal> = None;
        for value in values.iter().flatten() {
            let number = to_decimal(value)?;
            sum = Some(sum.unwrap_or_default() + number);
        }
        Ok(sum)
    })
}

fn to_decimal(value: &Value) -> Result<Decimal, MergeError> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        other => return Err(MergeError::TypeMismatch(other.to_string())),
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| MergeError::TypeMismatch(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use QualityOptions::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn point(value: Option<Value>, quality: Option<QualityOptions>, comment: Option<&str>) -> ExtendedDataPoint<Value> {
        ExtendedDataPoint {
            value,
            quality,
            comment: comment.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn quality_merge_picks_the_worst_ranked_quality() {
        assert_eq!(merge_quality(&[Some(Audited), Some(Reported)]), Some(Reported));
        assert_eq!(
            merge_quality(&[Some(Audited), Some(Incomplete), Some(Estimated)]),
            Some(Incomplete)
        );
        assert_eq!(merge_quality(&[Some(Audited), Some(Audited)]), Some(Audited));
    }

    #[test]
    fn quality_merge_ignores_no_data_found_among_real_qualities() {
        assert_eq!(merge_quality(&[Some(NoDataFound), Some(Estimated)]), Some(Estimated));
        assert_eq!(merge_quality(&[Some(NoDataFound), Some(NoDataFound)]), Some(NoDataFound));
    }

    #[test]
    fn quality_merge_propagates_missing_quality() {
        assert_eq!(merge_quality(&[None, Some(Audited)]), None);
        assert_eq!(merge_quality(&[Some(Reported), None, Some(NoDataFound)]), None);
        assert_eq!(merge_quality(&[None, None]), None);
        assert_eq!(merge_quality(&[]), None);
    }

    #[test]
    fn quality_merge_keeps_no_data_found_when_it_is_the_only_present_value() {
        assert_eq!(merge_quality(&[None, Some(NoDataFound)]), Some(NoDataFound));
    }

    #[test]
    fn comment_merge_joins_non_empty_comments() {
        assert_eq!(merge_comments([Some("Test"), Some("Test")]), Some("Test, Test".to_string()));
        assert_eq!(merge_comments([Some("")]), None);
        assert_eq!(
            merge_comments([Some("First"), Some(""), Some("Last")]),
            Some("First, Last".to_string())
        );
        assert_eq!(merge_comments([None::<&str>, None]), None);
    }

    #[test]
    fn sum_adds_values_and_merges_metadata() {
        let summed = sum_of_extended_data_points(&[
            point(Some(json!(1.5)), Some(Audited), Some("a")),
            point(Some(json!(2)), Some(Estimated), None),
            point(Some(json!("0.25")), Some(Reported), Some("c")),
        ])
        .unwrap();
        assert_eq!(summed.value, Some(Decimal::new(375, 2)));
        assert_eq!(summed.quality, Some(Estimated));
        assert_eq!(summed.comment, Some("a, c".to_string()));
        assert_eq!(summed.data_source, None);
    }

    #[test]
    fn sum_skips_points_without_data() {
        let summed = sum_of_extended_data_points(&[
            point(Some(json!(4)), Some(Reported), None),
            point(None, Some(NoDataFound), None),
        ])
        .unwrap();
        assert_eq!(summed.value, Some(Decimal::from(4)));
        assert_eq!(summed.quality, Some(Reported));
    }

    #[test]
    fn sum_rejects_non_numeric_values() {
        let result = sum_of_extended_data_points(&[
            point(Some(json!(4)), Some(Reported), None),
            point(Some(json!("four")), Some(Reported), None),
        ]);
        assert_eq!(result, Err(MergeError::TypeMismatch("four".to_string())));
        assert!(matches!(
            sum_of_extended_data_points(&[point(Some(json!(true)), Some(Reported), None)]),
            Err(MergeError::TypeMismatch(_))
        ));
    }

    #[test]
    fn sum_rejects_points_missing_a_value() {
        let result = sum_of_extended_data_points(&[
            point(Some(json!(4)), Some(Reported), None),
            point(None, Some(Estimated), None),
        ]);
        assert_eq!(result, Err(MergeError::MissingValue(1)));
    }

    #[test]
    fn transformation_applies_custom_function() {
        let points = vec![
            ExtendedDataPoint {
                value: Some(3_i64),
                quality: Some(Reported),
                ..Default::default()
            },
            ExtendedDataPoint {
                value: Some(7_i64),
                quality: Some(Reported),
                comment: Some("checked".to_string()),
                ..Default::default()
            },
        ];
        let max = apply_transformation(&points, |values| {
            Ok(values.iter().flatten().map(|value| **value).max())
        })
        .unwrap();
        assert_eq!(max.value, Some(7));
        assert_eq!(max.quality, Some(Reported));
        assert_eq!(max.comment, Some("checked".to_string()));
    }
}
