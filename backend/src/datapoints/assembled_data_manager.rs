//! Decomposition of framework datasets into data points, and their reassembly.
//!
//! A dataset of a framework with a specification is never stored as a whole. Its leaves are
//! validated, stored as individual data points and linked to the dataset id through a
//! `dataset_datapoint` mapping. Reading the dataset hydrates the framework schema from the stored
//! points and rebuilds `referencedReports` from their data sources.
//!
//! Frameworks without a specification but with a known id are handed to `data_manager`.

use crate::auth::AuthenticatedUser;
use crate::datapoints::data_point_manager::{self, can_view};
use crate::datapoints::{data_manager, data_point_validator, referenced_reports};
use crate::error::ApiError;
use crate::specification::json_specification::{self, REFERENCED_REPORTS_ID};
use crate::specification::FrameworkSpecification;
use crate::state::ServiceContext;
use crate::storage::dataset_datapoint::{self, DatasetDatapointEntity};
use crate::storage::{data_meta_information, data_point_meta_information, stored_data};
use common::model::data_point::UploadedDataPoint;
use common::model::dataset::{DataMetaInformation, StorableDataset};
use common::model::qa::QaStatus;
use common::validation::data_type;
use log::info;
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Formats a dataset can be exported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn parse(value: Option<&str>) -> Result<ExportFormat, ApiError> {
        match value.map(str::to_ascii_lowercase).as_deref() {
            None | Some("json") => Ok(ExportFormat::Json),
            Some("csv") => Ok(ExportFormat::Csv),
            Some(other) => Err(ApiError::invalid_input(
                "Unsupported export format",
                format!("The export format '{other}' is not supported. Use 'json' or 'csv'."),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDataset {
    pub content_type: &'static str,
    pub file_name: String,
    pub body: Vec<u8>,
}

fn schema_with_referenced_reports(framework: &FrameworkSpecification) -> Result<Value, ApiError> {
    let mut schema = framework.schema.clone();
    json_specification::insert_referenced_reports(
        &mut schema,
        framework.referenced_report_json_path.as_deref(),
    )?;
    Ok(schema)
}

/// Stores a dataset, decomposing it when its framework has a specification.
pub fn store_dataset(
    ctx: ServiceContext<'_>,
    dataset: &StorableDataset,
    bypass_qa: bool,
    correlation_id: &str,
) -> Result<DataMetaInformation, ApiError> {
    let Some(framework) = ctx.specifications.get_framework_specification(&dataset.data_type) else {
        if data_type::is_valid(Some(dataset.data_type.as_str())) {
            return data_manager::store_dataset(ctx, dataset, bypass_qa, correlation_id);
        }
        return Err(ApiError::invalid_input(
            "Framework not found",
            format!("Framework {} not found.", dataset.data_type),
        ));
    };
    let schema = schema_with_referenced_reports(framework)?;
    let data: Value = serde_json::from_str(&dataset.data).map_err(|e| {
        ApiError::invalid_input("Invalid input data", format!("The dataset is not valid JSON: {e}"))
    })?;
    let mut leaves = json_specification::dehydrate(&schema, &data)?;
    if framework.referenced_report_json_path.is_some() {
        referenced_reports::apply_referenced_reports(&mut leaves, correlation_id)?;
    }
    data_point_validator::validate_leaves(ctx.specifications, &leaves)?;

    let data_id = Uuid::new_v4().to_string();
    info!(
        "Storing {} dataset '{}' for company '{}' as {} data points (correlation ID: {})",
        dataset.data_type,
        data_id,
        dataset.company_id,
        leaves.values().filter(|leaf| !leaf.is_empty()).count(),
        correlation_id
    );
    let meta = data_manager::insert_meta_information(ctx, &data_id, dataset)?;
    let mut data_points = BTreeMap::new();
    for leaf in leaves.values() {
        if leaf.is_empty() || leaf.data_point_type == REFERENCED_REPORTS_ID {
            continue;
        }
        let data_point_id = Uuid::new_v4().to_string();
        let uploaded = UploadedDataPoint {
            data_point: serde_json::to_string(&leaf.content)?,
            data_point_type: leaf.data_point_type.clone(),
            company_id: dataset.company_id.clone(),
            reporting_period: dataset.reporting_period.clone(),
        };
        data_point_manager::store_data_point(
            ctx,
            &uploaded,
            &data_point_id,
            &dataset.uploader_user_id,
            dataset.upload_time,
            bypass_qa,
            correlation_id,
        )?;
        data_points.insert(leaf.data_point_type.clone(), data_point_id);
    }
    dataset_datapoint::save(
        ctx.conn,
        &DatasetDatapointEntity {
            dataset_id: data_id.clone(),
            data_points,
        },
    )?;
    ctx.queue
        .publish_dataset_qa_required(&data_id, bypass_qa, correlation_id)?;
    Ok(meta)
}

/// Data point ids of a dataset, keyed by data point type.
pub fn get_data_points_of_dataset(
    ctx: ServiceContext<'_>,
    dataset_id: &str,
) -> Result<BTreeMap<String, String>, ApiError> {
    dataset_datapoint::find(ctx.conn, dataset_id)?
        .map(|entity| entity.data_points)
        .ok_or_else(|| {
            ApiError::not_found(
                "Dataset not found",
                format!("No data points are linked to the dataset '{dataset_id}'."),
            )
        })
}

/// Fails unless `user` may read the dataset.
pub fn ensure_dataset_viewable(
    ctx: ServiceContext<'_>,
    dataset_id: &str,
    user: &AuthenticatedUser,
) -> Result<DataMetaInformation, ApiError> {
    let meta = data_manager::get_dataset_meta_information(ctx, dataset_id)?;
    if can_view(meta.qa_status, &meta.uploader_user_id, user) {
        return Ok(meta);
    }
    if let Some(mapping) = dataset_datapoint::find(ctx.conn, dataset_id)? {
        let ids: Vec<String> = mapping.data_points.into_values().collect();
        let points = data_point_meta_information::find_by_ids(ctx.conn, &ids)?;
        if !points.is_empty() && points.iter().all(|point| point.qa_status == QaStatus::Accepted) {
            return Ok(meta);
        }
    }
    Err(ApiError::insufficient_rights(
        "Access denied",
        format!("The dataset '{dataset_id}' has not been accepted yet."),
    ))
}

/// Assembles the dataset document.
pub fn get_dataset_data(
    ctx: ServiceContext<'_>,
    dataset_id: &str,
    data_type: &str,
    correlation_id: &str,
) -> Result<Value, ApiError> {
    let meta = data_meta_information::find_by_id(ctx.conn, dataset_id)?
        .ok_or_else(|| data_manager::dataset_not_found(dataset_id))?;
    if meta.data_type != data_type {
        return Err(ApiError::not_found(
            "Dataset not found",
            format!("The dataset '{dataset_id}' is not of type '{data_type}'."),
        ));
    }
    let Some(mapping) = dataset_datapoint::find(ctx.conn, dataset_id)? else {
        return data_manager::get_stored_dataset(ctx, dataset_id);
    };
    let framework = ctx
        .specifications
        .get_framework_specification(data_type)
        .ok_or_else(|| {
            ApiError::not_found(
                "Framework not found",
                format!("Framework {data_type} not found."),
            )
        })?;
    info!(
        "Assembling {} dataset '{}' from {} data points (correlation ID: {})",
        data_type,
        dataset_id,
        mapping.data_points.len(),
        correlation_id
    );
    let mut contents: BTreeMap<String, Value> = BTreeMap::new();
    for (data_point_type, data_point_id) in &mapping.data_points {
        let content = stored_data::find(ctx.conn, data_point_id)?.ok_or_else(|| {
            ApiError::not_found(
                "Data point not found",
                format!("The data point '{data_point_id}' of dataset '{dataset_id}' is missing."),
            )
        })?;
        contents.insert(data_point_type.clone(), serde_json::from_str(&content)?);
    }
    let reports = referenced_reports::collect_referenced_reports(contents.values());
    let reports = if reports.is_empty() {
        None
    } else {
        Some(serde_json::to_value(&reports)?)
    };
    let schema = schema_with_referenced_reports(framework)?;
    Ok(json_specification::hydrate(&schema, &|id| {
        if id == REFERENCED_REPORTS_ID {
            reports.clone()
        } else {
            contents.get(id).cloned()
        }
    }))
}

/// Renders an assembled dataset as JSON or as a two-line CSV of dotted leaf paths.
pub fn export_dataset(
    ctx: ServiceContext<'_>,
    dataset_id: &str,
    data_type: &str,
    format: ExportFormat,
    correlation_id: &str,
) -> Result<ExportedDataset, ApiError> {
    let data = get_dataset_data(ctx, dataset_id, data_type, correlation_id)?;
    match format {
        ExportFormat::Json => Ok(ExportedDataset {
            content_type: "application/json",
            file_name: format!("{data_type}-{dataset_id}.json"),
            body: serde_json::to_vec_pretty(&data)?,
        }),
        ExportFormat::Csv => {
            let mapping = json_specification::leaf_mapping(&data);
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(mapping.keys())?;
            writer.write_record(mapping.values())?;
            let body = writer.into_inner().map_err(|e| ApiError::Io(e.into_error()))?;
            Ok(ExportedDataset {
                content_type: "text/csv",
                file_name: format!("{data_type}-{dataset_id}.csv"),
                body,
            })
        }
    }
}
