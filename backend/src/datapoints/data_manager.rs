//! Datasets of frameworks without a specification, stored as a single document.

use crate::error::ApiError;
use crate::state::ServiceContext;
use crate::storage::data_meta_information::{self, DataMetaInformationEntity};
use crate::storage::stored_data;
use common::model::dataset::{DataMetaInformation, StorableDataset};
use common::model::qa::QaStatus;
use log::info;
use serde_json::Value;
use uuid::Uuid;

pub(crate) fn dataset_not_found(data_id: &str) -> ApiError {
    ApiError::not_found(
        "Dataset not found",
        format!("No dataset with the id '{data_id}' could be found."),
    )
}

/// Writes the meta information row of a new dataset.
pub(crate) fn insert_meta_information(
    ctx: ServiceContext<'_>,
    data_id: &str,
    dataset: &StorableDataset,
) -> Result<DataMetaInformation, ApiError> {
    let entity = DataMetaInformationEntity {
        data_id: data_id.to_string(),
        company_id: dataset.company_id.clone(),
        data_type: dataset.data_type.clone(),
        uploader_user_id: dataset.uploader_user_id.clone(),
        upload_time: dataset.upload_time,
        reporting_period: dataset.reporting_period.clone(),
        currently_active: false,
        qa_status: QaStatus::Pending,
    };
    data_meta_information::insert(ctx.conn, &entity)?;
    Ok(entity.to_api_model())
}

/// Stores the dataset as one blob and announces it with `DatasetUploaded`.
pub fn store_dataset(
    ctx: ServiceContext<'_>,
    dataset: &StorableDataset,
    bypass_qa: bool,
    correlation_id: &str,
) -> Result<DataMetaInformation, ApiError> {
    let data_id = Uuid::new_v4().to_string();
    info!(
        "Storing {} dataset '{}' for company '{}' as a whole (correlation ID: {})",
        dataset.data_type, data_id, dataset.company_id, correlation_id
    );
    stored_data::insert(ctx.conn, &data_id, &dataset.data)?;
    let meta = insert_meta_information(ctx, &data_id, dataset)?;
    ctx.queue
        .publish_dataset_uploaded(&data_id, bypass_qa, correlation_id)?;
    Ok(meta)
}

pub fn get_dataset_meta_information(
    ctx: ServiceContext<'_>,
    data_id: &str,
) -> Result<DataMetaInformation, ApiError> {
    data_meta_information::find_by_id(ctx.conn, data_id)?
        .map(|entity| entity.to_api_model())
        .ok_or_else(|| dataset_not_found(data_id))
}

/// The stored document of a dataset.
pub fn get_stored_dataset(ctx: ServiceContext<'_>, data_id: &str) -> Result<Value, ApiError> {
    let content = stored_data::find(ctx.conn, data_id)?.ok_or_else(|| dataset_not_found(data_id))?;
    Ok(serde_json::from_str(&content)?)
}

pub fn search_meta_information(
    ctx: ServiceContext<'_>,
    company_id: Option<&str>,
    data_type: Option<&str>,
    reporting_period: Option<&str>,
    only_active: bool,
) -> Result<Vec<DataMetaInformation>, ApiError> {
    Ok(
        data_meta_information::search(ctx.conn, company_id, data_type, reporting_period, only_active)?
            .iter()
            .map(DataMetaInformationEntity::to_api_model)
            .collect(),
    )
}
