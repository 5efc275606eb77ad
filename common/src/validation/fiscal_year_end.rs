use crate::validation::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

static FISCAL_YEAR_END: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^(\d{2})-([A-Z][a-z]{2})$"));

/// Days per month. February is fixed at 28: leap years are not special-cased.
const MONTHS: [(&str, u32); 12] = [
    ("Jan", 31),
    ("Feb", 28),
    ("Mar", 31),
    ("Apr", 30),
    ("May", 31),
    ("Jun", 30),
    ("Jul", 31),
    ("Aug", 31),
    ("Sep", 30),
    ("Oct", 31),
    ("Nov", 30),
    ("Dec", 31),
];

/// Checks a fiscal year end of the form `DD-Mon`, e.g. `31-Dec`.
pub fn is_valid(value: Option<&str>) -> bool {
    let Some(value) = value else {
        return true;
    };
    let Ok(pattern) = FISCAL_YEAR_END.as_ref() else {
        return false;
    };
    let Some(captures) = pattern.captures(value) else {
        return false;
    };
    let Ok(day) = captures[1].parse::<u32>() else {
        return false;
    };
    MONTHS
        .iter()
        .find(|(month, _)| *month == &captures[2])
        .is_some_and(|(_, days)| (1..=*days).contains(&day))
}

pub fn validate(value: Option<&str>) -> Result<(), ValidationError> {
    if is_valid(value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "fiscalYearEnd",
            format!("'{}' is not a valid day of the year in the form DD-Mon", value.unwrap_or_default()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_existing_days() {
        for value in ["31-Dec", "01-Jan", "28-Feb", "30-Jun", "31-Aug"] {
            assert!(is_valid(Some(value)), "{value}");
        }
        assert!(is_valid(None));
    }

    #[test]
    fn rejects_days_beyond_month_length() {
        for value in ["29-Feb", "31-Apr", "31-Nov", "32-Jan", "00-Mar"] {
            assert!(!is_valid(Some(value)), "{value}");
        }
    }

    #[test]
    fn rejects_malformed_input() {
        for value in ["1-Jan", "31-dec", "31-December", "31.Dec", "", "Dec-31", "31-Foo"] {
            assert!(!is_valid(Some(value)), "{value}");
        }
        assert_eq!(validate(Some("29-Feb")).unwrap_err().field, "fiscalYearEnd");
    }
}
