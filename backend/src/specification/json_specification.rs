//! Conversion between framework datasets and their data point leaves.
//!
//! A schema node is either a leaf, an object `{"id": <data point type>, "ref": <link>}`, or an
//! object of named child nodes. Dehydration walks schema and data side by side and collects the
//! content found at each leaf; hydration rebuilds the data tree from per-leaf content.

use crate::error::ApiError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Data point type of the leaf holding a dataset's `referencedReports`.
pub const REFERENCED_REPORTS_ID: &str = "extendedReferencedReports";

/// Content extracted from a dataset at one schema leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct DehydratedLeaf {
    pub data_point_type: String,
    pub json_path: String,
    pub content: Value,
}

impl DehydratedLeaf {
    pub fn is_empty(&self) -> bool {
        is_empty_content(&self.content)
    }
}

pub fn is_empty_content(content: &Value) -> bool {
    match content {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn leaf_id(node: &Value) -> Option<&str> {
    let object = node.as_object()?;
    if !object.contains_key("ref") {
        return None;
    }
    object.get("id").and_then(Value::as_str)
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Places the referenced reports leaf at `path` (dot separated), creating intermediate objects.
pub fn insert_referenced_reports(schema: &mut Value, path: Option<&str>) -> Result<(), ApiError> {
    let Some(path) = path.filter(|path| !path.is_empty()) else {
        return Ok(());
    };
    let segments: Vec<&str> = path.split('.').collect();
    let mut node = schema;
    for (index, segment) in segments.iter().enumerate() {
        let Some(object) = node.as_object_mut() else {
            return Err(ApiError::invalid_input(
                "Invalid framework specification",
                format!("Cannot insert referenced reports at '{path}'."),
            ));
        };
        if index + 1 == segments.len() {
            object.insert(
                segment.to_string(),
                serde_json::json!({"id": REFERENCED_REPORTS_ID, "ref": "internal"}),
            );
            return Ok(());
        }
        node = object
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if leaf_id(node).is_some() {
            return Err(ApiError::invalid_input(
                "Invalid framework specification",
                format!("Path '{path}' runs through the data point at '{segment}'."),
            ));
        }
    }
    Ok(())
}

/// Splits `data` into per-leaf content keyed by data point type. Fields of `data` that the
/// schema does not know are rejected.
pub fn dehydrate(schema: &Value, data: &Value) -> Result<BTreeMap<String, DehydratedLeaf>, ApiError> {
    let mut leaves = BTreeMap::new();
    dehydrate_node(schema, Some(data), "", &mut leaves)?;
    Ok(leaves)
}

fn dehydrate_node(
    schema: &Value,
    data: Option<&Value>,
    path: &str,
    leaves: &mut BTreeMap<String, DehydratedLeaf>,
) -> Result<(), ApiError> {
    if let Some(id) = leaf_id(schema) {
        let leaf = DehydratedLeaf {
            data_point_type: id.to_string(),
            json_path: path.to_string(),
            content: data.cloned().unwrap_or(Value::Null),
        };
        if leaves.insert(id.to_string(), leaf).is_some() {
            return Err(ApiError::invalid_input(
                "Invalid framework specification",
                format!("Data point type '{id}' appears more than once in the framework."),
            ));
        }
        return Ok(());
    }
    let Some(schema_object) = schema.as_object() else {
        return Ok(());
    };
    let data_object = match data {
        None | Some(Value::Null) => None,
        Some(Value::Object(object)) => Some(object),
        Some(_) => {
            return Err(ApiError::invalid_input(
                "Invalid input data",
                format!("Expected an object at '{}'.", if path.is_empty() { "$" } else { path }),
            ))
        }
    };
    if let Some(data_object) = data_object {
        if let Some(unknown) = data_object.keys().find(|key| !schema_object.contains_key(*key)) {
            return Err(ApiError::invalid_input(
                "Invalid input data",
                format!("Field '{}' is not part of the framework.", join_path(path, unknown)),
            ));
        }
    }
    for (key, child_schema) in schema_object {
        let child_data = data_object.and_then(|object| object.get(key));
        dehydrate_node(child_schema, child_data, &join_path(path, key), leaves)?;
    }
    Ok(())
}

/// Rebuilds a dataset from per-leaf content. Leaves `lookup` has no content for are omitted,
/// as are objects left without children.
pub fn hydrate(schema: &Value, lookup: &dyn Fn(&str) -> Option<Value>) -> Value {
    hydrate_node(schema, lookup).unwrap_or_else(|| Value::Object(Map::new()))
}

fn hydrate_node(schema: &Value, lookup: &dyn Fn(&str) -> Option<Value>) -> Option<Value> {
    if let Some(id) = leaf_id(schema) {
        return lookup(id).filter(|content| !content.is_null());
    }
    let schema_object = schema.as_object()?;
    let children: Map<String, Value> = schema_object
        .iter()
        .filter_map(|(key, child)| hydrate_node(child, lookup).map(|value| (key.clone(), value)))
        .collect();
    if children.is_empty() {
        None
    } else {
        Some(Value::Object(children))
    }
}

/// Flattens a JSON document into `dotted.path -> scalar` pairs. Array elements use their index
/// as path segment; `null` becomes an empty string.
pub fn leaf_mapping(value: &Value) -> BTreeMap<String, String> {
    let mut mapping = BTreeMap::new();
    collect_leaves(value, "", &mut mapping);
    mapping
}

fn collect_leaves(value: &Value, path: &str, mapping: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(object) => {
            for (key, child) in object {
                collect_leaves(child, &join_path(path, key), mapping);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                collect_leaves(child, &join_path(path, &index.to_string()), mapping);
            }
        }
        Value::Null => {
            mapping.insert(path.to_string(), String::new());
        }
        Value::String(text) => {
            mapping.insert(path.to_string(), text.clone());
        }
        other => {
            mapping.insert(path.to_string(), other.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "general": {
                "general": {
                    "fiscalYearEnd": {"id": "plainFiscalYearEnd", "ref": "https://example.org/fye"}
                },
                "financial": {
                    "equity": {"id": "extendedCurrencyEquity", "ref": "https://example.org/equity"},
                    "employees": {"id": "extendedIntegerEmployees", "ref": "https://example.org/employees"}
                }
            }
        })
    }

    #[test]
    fn referenced_reports_are_inserted_at_the_given_path() {
        let mut schema = schema();
        insert_referenced_reports(&mut schema, Some("general.general.referencedReports")).unwrap();
        assert_eq!(
            schema["general"]["general"]["referencedReports"],
            json!({"id": REFERENCED_REPORTS_ID, "ref": "internal"})
        );
        insert_referenced_reports(&mut schema, Some("other.nested.referencedReports")).unwrap();
        assert_eq!(schema["other"]["nested"]["referencedReports"]["id"], REFERENCED_REPORTS_ID);
    }

    #[test]
    fn no_path_leaves_schema_untouched() {
        let mut schema = schema();
        insert_referenced_reports(&mut schema, None).unwrap();
        assert_eq!(schema, self::schema());
    }

    #[test]
    fn path_through_a_leaf_is_rejected() {
        let mut schema = schema();
        assert!(insert_referenced_reports(
            &mut schema,
            Some("general.general.fiscalYearEnd.referencedReports")
        )
        .is_err());
    }

    #[test]
    fn dehydration_extracts_content_per_leaf() {
        let data = json!({
            "general": {
                "general": {"fiscalYearEnd": "31-Dec"},
                "financial": {"equity": {"value": 5, "currency": "EUR"}}
            }
        });
        let leaves = dehydrate(&schema(), &data).unwrap();
        assert_eq!(leaves.len(), 3);
        assert_eq!(leaves["plainFiscalYearEnd"].content, json!("31-Dec"));
        assert_eq!(leaves["plainFiscalYearEnd"].json_path, "general.general.fiscalYearEnd");
        assert_eq!(leaves["extendedCurrencyEquity"].content["currency"], "EUR");
        assert!(leaves["extendedIntegerEmployees"].is_empty());
    }

    #[test]
    fn dehydration_rejects_unknown_fields() {
        let data = json!({"general": {"general": {"unknown": 1}}});
        assert!(matches!(
            dehydrate(&schema(), &data),
            Err(ApiError::InvalidInput { .. })
        ));
    }

    #[test]
    fn hydration_rebuilds_and_prunes_empty_branches() {
        let contents = BTreeMap::from([
            ("plainFiscalYearEnd".to_string(), json!("31-Dec")),
        ]);
        let hydrated = hydrate(&schema(), &|id| contents.get(id).cloned());
        assert_eq!(hydrated, json!({"general": {"general": {"fiscalYearEnd": "31-Dec"}}}));
        assert_eq!(hydrate(&schema(), &|_| None), json!({}));
    }

    #[test]
    fn leaf_mapping_flattens_nested_values() {
        let mapping = leaf_mapping(&json!({
            "a": {"b": 1, "c": [true, null]},
            "d": "text"
        }));
        assert_eq!(
            mapping,
            BTreeMap::from([
                ("a.b".to_string(), "1".to_string()),
                ("a.c.0".to_string(), "true".to_string()),
                ("a.c.1".to_string(), String::new()),
                ("d".to_string(), "text".to_string()),
            ])
        );
    }
}
