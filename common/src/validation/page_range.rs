use crate::validation::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

static PAGE_RANGE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^([1-9]\d*)(?:-([1-9]\d*))?$"));

/// Checks a page reference: a single page `N` or a range `N-M` with `N >= 1` and `M > N`.
pub fn is_valid(value: Option<&str>) -> bool {
    let Some(value) = value else {
        return true;
    };
    let Ok(pattern) = PAGE_RANGE.as_ref() else {
        return false;
    };
    let Some(captures) = pattern.captures(value) else {
        return false;
    };
    match captures.get(2) {
        None => true,
        Some(last) => match (captures[1].parse::<u64>(), last.as_str().parse::<u64>()) {
            (Ok(first), Ok(last)) => last > first,
            _ => false,
        },
    }
}

pub fn validate(value: Option<&str>) -> Result<(), ValidationError> {
    if is_valid(value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "page",
            format!("'{}' is not a page number or ascending page range", value.unwrap_or_default()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_single_pages_and_ascending_ranges() {
        for value in ["1", "12", "1-2", "5-120"] {
            assert!(is_valid(Some(value)), "{value}");
        }
        assert!(is_valid(None));
    }

    #[test]
    fn rejects_zero_descending_and_malformed_ranges() {
        for value in ["0", "0-3", "3-3", "4-2", "01", "1-", "-1", "a", "1 - 2", "", "1-2-3"] {
            assert!(!is_valid(Some(value)), "{value}");
        }
    }
}
