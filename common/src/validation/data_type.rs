use crate::validation::ValidationError;

/// Framework identifiers accepted as a dataset's data type.
pub const KNOWN_DATA_TYPES: &[&str] = &[
    "sfdr",
    "lksg",
    "eutaxonomy-financials",
    "eutaxonomy-non-financials",
    "eutaxonomy-nuclear-and-gas",
    "p2p",
    "sme",
    "vsme",
    "heimathafen",
    "additional-company-information",
    "esg-datenkatalog",
    "pcaf",
];

pub fn is_valid(value: Option<&str>) -> bool {
    value.is_none_or(|data_type| KNOWN_DATA_TYPES.contains(&data_type))
}

pub fn validate(value: Option<&str>) -> Result<(), ValidationError> {
    if is_valid(value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "dataType",
            format!("'{}' is not a known framework", value.unwrap_or_default()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_data_type_is_valid() {
        assert!(is_valid(None));
    }

    #[test]
    fn known_frameworks_are_valid() {
        assert!(is_valid(Some("sfdr")));
        assert!(is_valid(Some("lksg")));
        assert!(is_valid(Some("eutaxonomy-non-financials")));
    }

    #[test]
    fn arbitrary_strings_are_invalid() {
        assert!(!is_valid(Some("not-a-framework")));
        assert!(!is_valid(Some("SFDR")));
        assert!(!is_valid(Some("")));
    }
}
