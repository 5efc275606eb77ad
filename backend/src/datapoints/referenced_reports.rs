//! Consistency between a dataset's `referencedReports` and the data sources of its data points.
//!
//! Uploaded datasets list every report they cite once, keyed by report name. Data points refer to
//! a report through `dataSource.fileReference`. On upload the two must agree: every cited report
//! must be listed, every listed report must be cited, and file references must be unique. The
//! listed file name and publication date win over whatever a data point carries.

use crate::error::ApiError;
use crate::specification::json_specification::{DehydratedLeaf, REFERENCED_REPORTS_ID};
use common::model::document::{CompanyReport, ExtendedDocumentReference};
use log::warn;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};

const DATA_SOURCE: &str = "dataSource";

/// Reads the referenced reports leaf. A missing or empty leaf yields an empty map.
pub fn parse_referenced_reports(
    leaf: Option<&DehydratedLeaf>,
) -> Result<BTreeMap<String, CompanyReport>, ApiError> {
    let Some(leaf) = leaf.filter(|leaf| !leaf.is_empty()) else {
        return Ok(BTreeMap::new());
    };
    serde_json::from_value(leaf.content.clone()).map_err(|e| {
        ApiError::invalid_input(
            "Invalid referenced reports",
            format!("The referenced reports could not be read: {e}"),
        )
    })
}

/// Rejects lists citing the same file twice.
pub fn validate_referenced_report_consistency(
    reports: &BTreeMap<String, CompanyReport>,
) -> Result<(), ApiError> {
    let mut seen = BTreeSet::new();
    for report in reports.values() {
        if !seen.insert(report.file_reference.as_str()) {
            return Err(ApiError::invalid_input(
                "Duplicate document reference",
                format!(
                    "The file reference '{}' appears more than once in the referenced reports.",
                    report.file_reference
                ),
            ));
        }
    }
    Ok(())
}

/// The report a data point's top-level `dataSource` points at, if any.
pub fn company_report_from_data_source(content: &Value) -> Option<CompanyReport> {
    let source = content.get(DATA_SOURCE)?;
    serde_json::from_value::<ExtendedDocumentReference>(source.clone())
        .ok()
        .map(|reference| CompanyReport::from(&reference))
}

/// Every report cited anywhere below `content`, in document order.
pub fn all_company_reports_from_data_source(content: &Value, reports: &mut Vec<CompanyReport>) {
    match content {
        Value::Object(object) => {
            for (key, child) in object {
                if key == DATA_SOURCE {
                    if let Ok(reference) =
                        serde_json::from_value::<ExtendedDocumentReference>(child.clone())
                    {
                        reports.push(CompanyReport::from(&reference));
                        continue;
                    }
                }
                all_company_reports_from_data_source(child, reports);
            }
        }
        Value::Array(items) => {
            for item in items {
                all_company_reports_from_data_source(item, reports);
            }
        }
        _ => {}
    }
}

/// Checks that a cited report is listed. A diverging publication date is logged and left to be
/// overwritten from the list.
pub fn validate_report_consistency_with_global_list(
    cited: &CompanyReport,
    reports: &BTreeMap<String, CompanyReport>,
    correlation_id: &str,
) -> Result<(), ApiError> {
    let Some(listed) = reports
        .values()
        .find(|report| report.file_reference == cited.file_reference)
    else {
        return Err(ApiError::invalid_input(
            "Invalid document reference",
            format!(
                "The report '{}' with file reference '{}' is not listed in the referenced reports.",
                cited.key(),
                cited.file_reference
            ),
        ));
    };
    if let (Some(cited_date), Some(listed_date)) = (&cited.publication_date, &listed.publication_date) {
        if cited_date != listed_date {
            warn!(
                "The publication date of the report '{}' is '{}' and inconsistent with the publication date \
                 listed in the referenced reports '{}'. The publication date of the report will be overwritten \
                 to '{}'. (correlation ID: {})",
                cited.key(),
                cited_date,
                listed_date,
                listed_date,
                correlation_id
            );
        }
    }
    Ok(())
}

/// Rewrites `fileName` and `publicationDate` of every data source below `content` whose file
/// reference appears in the mappings.
pub fn update_data_sources(
    content: &mut Value,
    publication_dates: &HashMap<String, String>,
    file_names: &HashMap<String, String>,
) {
    match content {
        Value::Object(object) => {
            for (key, child) in object.iter_mut() {
                if key == DATA_SOURCE {
                    if let Some(source) = child.as_object_mut() {
                        let file_reference = source
                            .get("fileReference")
                            .and_then(Value::as_str)
                            .map(str::to_string);
                        if let Some(file_reference) = file_reference {
                            if let Some(date) = publication_dates.get(&file_reference) {
                                source.insert("publicationDate".to_string(), Value::String(date.clone()));
                            }
                            if let Some(name) = file_names.get(&file_reference) {
                                source.insert("fileName".to_string(), Value::String(name.clone()));
                            }
                            continue;
                        }
                    }
                }
                update_data_sources(child, publication_dates, file_names);
            }
        }
        Value::Array(items) => {
            for item in items {
                update_data_sources(item, publication_dates, file_names);
            }
        }
        _ => {}
    }
}

/// Runs every referenced report check on the leaves of one dataset and aligns the data sources
/// with the list. Leaves are changed in place.
pub fn apply_referenced_reports(
    leaves: &mut BTreeMap<String, DehydratedLeaf>,
    correlation_id: &str,
) -> Result<(), ApiError> {
    let reports = parse_referenced_reports(leaves.get(REFERENCED_REPORTS_ID))?;
    validate_referenced_report_consistency(&reports)?;

    let mut cited_references = BTreeSet::new();
    for leaf in leaves.values().filter(|leaf| leaf.data_point_type != REFERENCED_REPORTS_ID) {
        let mut cited = Vec::new();
        all_company_reports_from_data_source(&leaf.content, &mut cited);
        for report in cited {
            validate_report_consistency_with_global_list(&report, &reports, correlation_id)?;
            cited_references.insert(report.file_reference);
        }
    }
    let unused: Vec<&str> = reports
        .iter()
        .filter(|(_, report)| !cited_references.contains(&report.file_reference))
        .map(|(name, _)| name.as_str())
        .collect();
    if !unused.is_empty() {
        return Err(ApiError::invalid_input(
            "Mismatching document references",
            format!(
                "The referenced reports {} are not used as a data source by any data point.",
                unused.join(", ")
            ),
        ));
    }

    let publication_dates: HashMap<String, String> = reports
        .values()
        .filter_map(|report| {
            report
                .publication_date
                .clone()
                .map(|date| (report.file_reference.clone(), date))
        })
        .collect();
    let file_names: HashMap<String, String> = reports
        .iter()
        .map(|(name, report)| {
            (
                report.file_reference.clone(),
                report.file_name.clone().unwrap_or_else(|| name.clone()),
            )
        })
        .collect();
    for leaf in leaves.values_mut().filter(|leaf| leaf.data_point_type != REFERENCED_REPORTS_ID) {
        update_data_sources(&mut leaf.content, &publication_dates, &file_names);
    }
    Ok(())
}

/// Rebuilds the `referencedReports` map from the data sources of stored data points, keyed by
/// `fileName`, falling back to `fileReference`.
pub fn collect_referenced_reports<'a>(
    contents: impl IntoIterator<Item = &'a Value>,
) -> BTreeMap<String, CompanyReport> {
    let mut reports = BTreeMap::new();
    for content in contents {
        let mut cited = Vec::new();
        all_company_reports_from_data_source(content, &mut cited);
        for report in cited {
            reports.entry(report.key().to_string()).or_insert(report);
        }
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn leaf(data_point_type: &str, content: Value) -> (String, DehydratedLeaf) {
        (
            data_point_type.to_string(),
            DehydratedLeaf {
                data_point_type: data_point_type.to_string(),
                json_path: format!("general.{data_point_type}"),
                content,
            },
        )
    }

    fn reports_leaf() -> (String, DehydratedLeaf) {
        leaf(
            REFERENCED_REPORTS_ID,
            json!({
                "AnnualReport": {"fileReference": "ref-annual", "fileName": "AnnualReport", "publicationDate": "2023-11-04"},
                "SustainabilityReport": {"fileReference": "ref-sustainability", "fileName": "SustainabilityReport"}
            }),
        )
    }

    #[test]
    fn duplicate_file_references_are_rejected() {
        let reports: BTreeMap<String, CompanyReport> = serde_json::from_value(json!({
            "a": {"fileReference": "ref1"},
            "b": {"fileReference": "ref1"}
        }))
        .unwrap();
        assert!(matches!(
            validate_referenced_report_consistency(&reports),
            Err(ApiError::InvalidInput { .. })
        ));
    }

    #[test]
    fn missing_leaf_yields_no_reports() {
        assert!(parse_referenced_reports(None).unwrap().is_empty());
    }

    #[test]
    fn unlisted_data_source_is_rejected() {
        let cited = CompanyReport {
            file_reference: "fileReference".to_string(),
            file_name: Some("fileName".to_string()),
            publication_date: None,
        };
        assert!(validate_report_consistency_with_global_list(&cited, &BTreeMap::new(), "c").is_err());
    }

    #[test]
    fn nested_data_sources_are_found_in_order() {
        let content = json!({
            "value": [
                {"branch": {"dataSource": {"fileReference": "1", "fileName": "SubBranch1"}}},
                {"dataSource": {"fileReference": "2", "fileName": "SubBranch2", "publicationDate": "2023-11-04"}}
            ],
            "dataSource": {"fileReference": "3", "fileName": "Branch2"}
        });
        let mut reports = Vec::new();
        all_company_reports_from_data_source(&content, &mut reports);
        let references: Vec<&str> = reports.iter().map(|r| r.file_reference.as_str()).collect();
        assert_eq!(references, vec!["3", "1", "2"]);
    }

    #[test]
    fn data_sources_take_name_and_date_from_the_list() {
        let mut leaves = BTreeMap::from([
            reports_leaf(),
            leaf(
                "extendedCurrencyEquity",
                json!({"value": 1, "quality": "Reported", "currency": "EUR",
                       "dataSource": {"fileReference": "ref-annual", "fileName": "old", "page": "3", "publicationDate": "2023-05-03"}}),
            ),
            leaf(
                "extendedDecimalRevenue",
                json!({"value": 2, "quality": "Audited",
                       "dataSource": {"fileReference": "ref-sustainability"}}),
            ),
        ]);
        apply_referenced_reports(&mut leaves, "corr").unwrap();
        assert_eq!(
            leaves["extendedCurrencyEquity"].content["dataSource"],
            json!({"fileReference": "ref-annual", "fileName": "AnnualReport", "page": "3", "publicationDate": "2023-11-04"})
        );
        assert_eq!(
            leaves["extendedDecimalRevenue"].content["dataSource"],
            json!({"fileReference": "ref-sustainability", "fileName": "SustainabilityReport"})
        );
    }

    #[test]
    fn unused_report_is_a_mismatch() {
        let mut leaves = BTreeMap::from([
            reports_leaf(),
            leaf(
                "extendedDecimalRevenue",
                json!({"value": 2, "quality": "Audited", "dataSource": {"fileReference": "ref-annual"}}),
            ),
        ]);
        match apply_referenced_reports(&mut leaves, "corr") {
            Err(ApiError::InvalidInput { summary, .. }) => {
                assert_eq!(summary, "Mismatching document references")
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn collected_reports_are_keyed_by_file_name() {
        let first = json!({"dataSource": {"fileReference": "r1", "fileName": "Annual"}});
        let second = json!({"dataSource": {"fileReference": "r2"}});
        let reports = collect_referenced_reports([&first, &second]);
        assert_eq!(reports.keys().cloned().collect::<Vec<_>>(), vec!["Annual", "r2"]);
    }
}
