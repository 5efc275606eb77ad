//! Storage, retrieval and bookkeeping of single data points.

use crate::auth::{AuthenticatedUser, Role};
use crate::datapoints::data_point_validator;
use crate::error::ApiError;
use crate::state::ServiceContext;
use crate::storage::data_point_meta_information::{self, DataPointMetaInformationEntity};
use crate::storage::{now_millis, stored_data};
use common::messages::DataPointUploadedPayload;
use common::model::data_point::{
    BasicDataPointDimensions, DataPointMetaInformation, UploadedDataPoint,
};
use common::model::qa::QaStatus;
use common::requests::DataPointSearchQuery;
use log::info;
use uuid::Uuid;

/// Accepted data is public; anything else is only visible to its uploader and to reviewers.
pub fn can_view(qa_status: QaStatus, uploader_user_id: &str, user: &AuthenticatedUser) -> bool {
    qa_status == QaStatus::Accepted
        || uploader_user_id == user.user_id
        || user.has_role(Role::Reviewer)
}

fn not_found(data_point_id: &str) -> ApiError {
    ApiError::not_found(
        "Data point not found",
        format!("No data point with the id '{data_point_id}' could be found."),
    )
}

pub fn validate_data_point(
    ctx: ServiceContext<'_>,
    uploaded: &UploadedDataPoint,
    correlation_id: &str,
) -> Result<(), ApiError> {
    info!(
        "Validating data point of type '{}' for company '{}' (correlation ID: {})",
        uploaded.data_point_type, uploaded.company_id, correlation_id
    );
    data_point_validator::validate_serialized(
        ctx.specifications,
        &uploaded.data_point_type,
        &uploaded.data_point,
    )
}

/// Validates and stores a data point uploaded on its own.
pub fn process_data_point(
    ctx: ServiceContext<'_>,
    uploaded: &UploadedDataPoint,
    user: &AuthenticatedUser,
    bypass_qa: bool,
    correlation_id: &str,
) -> Result<DataPointMetaInformation, ApiError> {
    validate_data_point(ctx, uploaded, correlation_id)?;
    if bypass_qa && !user.has_role(Role::Reviewer) {
        return Err(ApiError::insufficient_rights(
            "Insufficient rights",
            "Bypassing the QA process requires reviewer or admin rights.",
        ));
    }
    let data_point_id = Uuid::new_v4().to_string();
    store_data_point(
        ctx,
        uploaded,
        &data_point_id,
        &user.user_id,
        now_millis(),
        bypass_qa,
        correlation_id,
    )
}

/// Persists the content and meta information of a data point and announces it to QA.
pub fn store_data_point(
    ctx: ServiceContext<'_>,
    uploaded: &UploadedDataPoint,
    data_point_id: &str,
    uploader_user_id: &str,
    upload_time: i64,
    bypass_qa: bool,
    correlation_id: &str,
) -> Result<DataPointMetaInformation, ApiError> {
    info!(
        "Storing data point '{}' of type '{}' (correlation ID: {})",
        data_point_id, uploaded.data_point_type, correlation_id
    );
    stored_data::insert(ctx.conn, data_point_id, &uploaded.data_point)?;
    let entity = DataPointMetaInformationEntity {
        data_point_id: data_point_id.to_string(),
        data_point_type: uploaded.data_point_type.clone(),
        company_id: uploaded.company_id.clone(),
        reporting_period: uploaded.reporting_period.clone(),
        uploader_user_id: uploader_user_id.to_string(),
        upload_time,
        currently_active: false,
        qa_status: QaStatus::Pending,
    };
    data_point_meta_information::insert(ctx.conn, &entity)?;
    ctx.queue.publish_data_point_uploaded(
        &DataPointUploadedPayload {
            data_point_id: data_point_id.to_string(),
            company_id: uploaded.company_id.clone(),
            data_point_type: uploaded.data_point_type.clone(),
            reporting_period: uploaded.reporting_period.clone(),
            bypass_qa,
            uploader_user_id: uploader_user_id.to_string(),
            upload_time,
        },
        correlation_id,
    )?;
    Ok(entity.to_api_model())
}

/// Content of a data point, if the user may see it.
pub fn retrieve_data_point(
    ctx: ServiceContext<'_>,
    data_point_id: &str,
    user: &AuthenticatedUser,
    correlation_id: &str,
) -> Result<UploadedDataPoint, ApiError> {
    let meta = data_point_meta_information::find_by_id(ctx.conn, data_point_id)?
        .ok_or_else(|| not_found(data_point_id))?;
    if !can_view(meta.qa_status, &meta.uploader_user_id, user) {
        return Err(ApiError::insufficient_rights(
            "Access denied",
            format!("The data point '{data_point_id}' has not been accepted yet."),
        ));
    }
    info!(
        "Retrieving data point '{}' (correlation ID: {})",
        data_point_id, correlation_id
    );
    let content =
        stored_data::find(ctx.conn, data_point_id)?.ok_or_else(|| not_found(data_point_id))?;
    Ok(UploadedDataPoint {
        data_point: content,
        data_point_type: meta.data_point_type,
        company_id: meta.company_id,
        reporting_period: meta.reporting_period,
    })
}

/// Moves the active flag of the given dimensions to `new_active_id`, or clears it.
pub fn update_currently_active_data_point(
    ctx: ServiceContext<'_>,
    dimensions: &BasicDataPointDimensions,
    new_active_id: Option<&str>,
    correlation_id: &str,
) -> Result<(), ApiError> {
    let previous = data_point_meta_information::find_currently_active(ctx.conn, dimensions)?;
    if let Some(previous) = &previous {
        if Some(previous.data_point_id.as_str()) != new_active_id {
            data_point_meta_information::set_currently_active(ctx.conn, &previous.data_point_id, false)?;
        }
    }
    if let Some(active_id) = new_active_id {
        data_point_meta_information::set_currently_active(ctx.conn, active_id, true)?;
    }
    info!(
        "Currently active data point of type '{}' for company '{}' and period '{}' changed from {:?} to {:?} (correlation ID: {})",
        dimensions.data_point_type,
        dimensions.company_id,
        dimensions.reporting_period,
        previous.map(|entity| entity.data_point_id),
        new_active_id,
        correlation_id
    );
    Ok(())
}

/// Newest upload time among the currently active data points of the given dimensions.
pub fn get_latest_upload_time_of_currently_active(
    ctx: ServiceContext<'_>,
    dimensions: &[BasicDataPointDimensions],
) -> Result<Option<i64>, ApiError> {
    let mut latest = None;
    for dimension in dimensions {
        if let Some(active) = data_point_meta_information::find_currently_active(ctx.conn, dimension)? {
            latest = latest.max(Some(active.upload_time));
        }
    }
    Ok(latest)
}

pub fn get_meta_information(
    ctx: ServiceContext<'_>,
    data_point_id: &str,
) -> Result<DataPointMetaInformation, ApiError> {
    data_point_meta_information::find_by_id(ctx.conn, data_point_id)?
        .map(|entity| entity.to_api_model())
        .ok_or_else(|| not_found(data_point_id))
}

pub fn search(
    ctx: ServiceContext<'_>,
    query: &DataPointSearchQuery,
) -> Result<Vec<DataPointMetaInformation>, ApiError> {
    let found = data_point_meta_information::search(
        ctx.conn,
        query.company_id.as_deref(),
        query.data_point_type.as_deref(),
        query.reporting_period.as_deref(),
        query.show_only_active,
    )?;
    Ok(found
        .into_iter()
        .filter(|entity| query.qa_status.is_none_or(|status| entity.qa_status == status))
        .map(|entity| entity.to_api_model())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{drain, read_payload};
    use crate::testing::{self, uploaded_equity};
    use common::messages::MessageType;

    #[test]
    fn storing_publishes_one_upload_message() {
        let mut setup = testing::setup();
        let meta = setup
            .state
            .transaction(|ctx| {
                store_data_point(ctx, &uploaded_equity("100"), "dp-1", "uploader", 5, false, "corr")
            })
            .unwrap();
        assert_eq!(meta.qa_status, QaStatus::Pending);
        assert!(!meta.currently_active);

        let messages = drain(&mut setup.rx);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_type, MessageType::DATA_POINT_UPLOADED);
        assert_eq!(messages[0].correlation_id, "corr");
        let payload: DataPointUploadedPayload = read_payload(&messages[0]).unwrap();
        assert_eq!(payload.data_point_id, "dp-1");
        assert_eq!(payload.uploader_user_id, "uploader");
        assert_eq!(payload.upload_time, 5);
    }

    #[test]
    fn bypassing_qa_requires_reviewer_rights() {
        let setup = testing::setup();
        let uploader = AuthenticatedUser::new("uploader", &[Role::Uploader]);
        let result = setup.state.transaction(|ctx| {
            process_data_point(ctx, &uploaded_equity("100"), &uploader, true, "corr")
        });
        assert!(matches!(result, Err(ApiError::InsufficientRights { .. })));

        let reviewer = AuthenticatedUser::new("reviewer", &[Role::Reviewer]);
        let result = setup.state.transaction(|ctx| {
            process_data_point(ctx, &uploaded_equity("100"), &reviewer, true, "corr")
        });
        assert!(result.is_ok());
    }

    #[test]
    fn invalid_content_is_rejected_before_storing() {
        let mut setup = testing::setup();
        let uploader = AuthenticatedUser::new("uploader", &[Role::Uploader]);
        let result = setup.state.transaction(|ctx| {
            process_data_point(ctx, &uploaded_equity("-3"), &uploader, false, "corr")
        });
        assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
        assert!(drain(&mut setup.rx).is_empty());
    }

    #[test]
    fn pending_points_are_only_visible_to_uploader_and_reviewers() {
        let setup = testing::setup();
        setup
            .state
            .transaction(|ctx| {
                store_data_point(ctx, &uploaded_equity("100"), "dp-1", "uploader", 5, false, "c")
            })
            .unwrap();
        let stranger = AuthenticatedUser::new("stranger", &[Role::User]);
        let uploader = AuthenticatedUser::new("uploader", &[Role::Uploader]);
        let result = setup
            .state
            .read(|ctx| retrieve_data_point(ctx, "dp-1", &stranger, "c"));
        assert!(matches!(result, Err(ApiError::InsufficientRights { .. })));
        assert!(setup
            .state
            .read(|ctx| retrieve_data_point(ctx, "dp-1", &uploader, "c"))
            .is_ok());

        setup
            .state
            .transaction(|ctx| {
                data_point_meta_information::update_qa_status(ctx.conn, "dp-1", QaStatus::Accepted)
            })
            .unwrap();
        let retrieved = setup
            .state
            .read(|ctx| retrieve_data_point(ctx, "dp-1", &stranger, "c"))
            .unwrap();
        assert_eq!(retrieved.data_point_type, "extendedCurrencyEquity");
    }

    #[test]
    fn unknown_data_point_is_not_found() {
        let setup = testing::setup();
        let user = AuthenticatedUser::new("user", &[Role::Admin]);
        assert!(matches!(
            setup.state.read(|ctx| retrieve_data_point(ctx, "missing", &user, "c")),
            Err(ApiError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn active_flag_moves_to_the_newer_point() {
        let setup = testing::setup();
        let dimensions = setup
            .state
            .transaction(|ctx| {
                let first = store_data_point(ctx, &uploaded_equity("1"), "old", "u", 1, false, "c")?;
                store_data_point(ctx, &uploaded_equity("2"), "new", "u", 2, false, "c")?;
                let dimensions = BasicDataPointDimensions {
                    company_id: first.company_id,
                    data_point_type: first.data_point_type,
                    reporting_period: first.reporting_period,
                };
                update_currently_active_data_point(ctx, &dimensions, Some("old"), "c")?;
                update_currently_active_data_point(ctx, &dimensions, Some("new"), "c")?;
                Ok(dimensions)
            })
            .unwrap();
        setup
            .state
            .read(|ctx| {
                assert!(!get_meta_information(ctx, "old")?.currently_active);
                assert!(get_meta_information(ctx, "new")?.currently_active);
                assert_eq!(
                    get_latest_upload_time_of_currently_active(ctx, &[dimensions.clone()])?,
                    Some(2)
                );
                Ok(())
            })
            .unwrap();
    }
}
