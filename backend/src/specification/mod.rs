//! Framework and data point type specifications.
//!
//! A framework specification describes the JSON shape of a dataset as a tree whose leaves name
//! data point types; a data point type specification names the base type its content must have
//! together with optional constraints. Specifications are read once at start-up from a directory:
//!
//! ```text
//! <dir>/frameworks/<framework>.json        {"id", "name", "schema", "referencedReportJsonPath"}
//! <dir>/data-point-types/<type>.json       {"id", "name", "baseType", "constraints"}
//! ```

pub mod json_specification;

use log::{info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub use json_specification::REFERENCED_REPORTS_ID;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkSpecification {
    pub id: String,
    pub name: String,
    pub schema: Value,
    #[serde(default)]
    pub referenced_report_json_path: Option<String>,
}

/// Shape a data point's content must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BaseType {
    ExtendedDecimal,
    ExtendedInteger,
    ExtendedCurrency,
    ExtendedEnum,
    ExtendedDate,
    ExtendedString,
    ExtendedYesNo,
    ExtendedReferencedReports,
    PlainString,
    PlainDate,
    PlainEnum,
    PlainInteger,
    PlainDecimal,
    PlainYesNo,
    PlainFiscalYearEnd,
    PlainCurrency,
}

impl BaseType {
    /// Extended types wrap their value in a data point envelope.
    pub fn is_extended(self) -> bool {
        matches!(
            self,
            BaseType::ExtendedDecimal
                | BaseType::ExtendedInteger
                | BaseType::ExtendedCurrency
                | BaseType::ExtendedEnum
                | BaseType::ExtendedDate
                | BaseType::ExtendedString
                | BaseType::ExtendedYesNo
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(default)]
    pub minimum: Option<Decimal>,
    #[serde(default)]
    pub maximum: Option<Decimal>,
    #[serde(default)]
    pub allowed_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPointTypeSpecification {
    pub id: String,
    pub name: String,
    pub base_type: BaseType,
    #[serde(default)]
    pub constraints: Constraints,
}

/// Lookup of specifications by id.
pub trait SpecificationClient: Send + Sync {
    fn get_framework_specification(&self, framework_id: &str) -> Option<&FrameworkSpecification>;
    fn get_data_point_type_specification(&self, data_point_type: &str)
        -> Option<&DataPointTypeSpecification>;
    fn list_framework_ids(&self) -> Vec<String>;
}

/// In-memory specification store.
#[derive(Debug, Clone)]
pub struct SpecificationRegistry {
    frameworks: HashMap<String, FrameworkSpecification>,
    data_point_types: HashMap<String, DataPointTypeSpecification>,
}

impl Default for SpecificationRegistry {
    fn default() -> Self {
        let mut registry = SpecificationRegistry {
            frameworks: HashMap::new(),
            data_point_types: HashMap::new(),
        };
        registry.insert_data_point_type(DataPointTypeSpecification {
            id: REFERENCED_REPORTS_ID.to_string(),
            name: "Referenced Reports".to_string(),
            base_type: BaseType::ExtendedReferencedReports,
            constraints: Constraints::default(),
        });
        registry
    }
}

impl SpecificationRegistry {
    pub fn new() -> Self {
        SpecificationRegistry::default()
    }

    pub fn insert_framework(&mut self, framework: FrameworkSpecification) {
        self.frameworks.insert(framework.id.clone(), framework);
    }

    pub fn insert_data_point_type(&mut self, data_point_type: DataPointTypeSpecification) {
        self.data_point_types
            .insert(data_point_type.id.clone(), data_point_type);
    }

    /// Loads every specification file below `dir`. A missing directory yields a registry with
    /// only the built-in types.
    pub fn load_from_dir(dir: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let mut registry = SpecificationRegistry::new();
        if !dir.is_dir() {
            warn!(
                "Specification directory {} not found, every framework is stored as a whole",
                dir.display()
            );
            return Ok(registry);
        }
        for path in json_files(&dir.join("data-point-types"))? {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("could not read {}", path.display()))?;
            let spec: DataPointTypeSpecification = serde_json::from_str(&content)
                .with_context(|| format!("invalid data point type specification {}", path.display()))?;
            registry.insert_data_point_type(spec);
        }
        for path in json_files(&dir.join("frameworks"))? {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("could not read {}", path.display()))?;
            let spec: FrameworkSpecification = serde_json::from_str(&content)
                .with_context(|| format!("invalid framework specification {}", path.display()))?;
            registry.insert_framework(spec);
        }
        info!(
            "Loaded {} framework and {} data point type specifications from {}",
            registry.frameworks.len(),
            registry.data_point_types.len(),
            dir.display()
        );
        Ok(registry)
    }
}

fn json_files(dir: &Path) -> anyhow::Result<Vec<std::path::PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

impl SpecificationClient for SpecificationRegistry {
    fn get_framework_specification(&self, framework_id: &str) -> Option<&FrameworkSpecification> {
        self.frameworks.get(framework_id)
    }

    fn get_data_point_type_specification(
        &self,
        data_point_type: &str,
    ) -> Option<&DataPointTypeSpecification> {
        self.data_point_types.get(data_point_type)
    }

    fn list_framework_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.frameworks.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn loads_frameworks_and_types_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("frameworks")).unwrap();
        fs::create_dir_all(dir.path().join("data-point-types")).unwrap();
        let mut framework = fs::File::create(dir.path().join("frameworks/sfdr.json")).unwrap();
        write!(
            framework,
            "{}",
            json!({
                "id": "sfdr",
                "name": "SFDR",
                "schema": {"general": {"fiscalYearEnd": {"id": "plainFiscalYearEnd", "ref": "x"}}},
                "referencedReportJsonPath": "general.referencedReports"
            })
        )
        .unwrap();
        let mut data_point_type =
            fs::File::create(dir.path().join("data-point-types/plainFiscalYearEnd.json")).unwrap();
        write!(
            data_point_type,
            "{}",
            json!({"id": "plainFiscalYearEnd", "name": "Fiscal Year End", "baseType": "plainFiscalYearEnd"})
        )
        .unwrap();

        let registry = SpecificationRegistry::load_from_dir(dir.path()).unwrap();
        let sfdr = registry.get_framework_specification("sfdr").unwrap();
        assert_eq!(sfdr.referenced_report_json_path.as_deref(), Some("general.referencedReports"));
        assert_eq!(
            registry
                .get_data_point_type_specification("plainFiscalYearEnd")
                .unwrap()
                .base_type,
            BaseType::PlainFiscalYearEnd
        );
        assert!(registry
            .get_data_point_type_specification(REFERENCED_REPORTS_ID)
            .is_some());
        assert_eq!(registry.list_framework_ids(), vec!["sfdr".to_string()]);
    }

    #[test]
    fn missing_directory_yields_builtin_types_only() {
        let registry =
            SpecificationRegistry::load_from_dir(Path::new("/definitely/not/here")).unwrap();
        assert!(registry.list_framework_ids().is_empty());
    }
}
