//! Bills data sourcing requests when they are set to processing.

use crate::error::ApiError;
use crate::messaging::{read_payload, validate_message_type};
use crate::state::ServiceContext;
use crate::storage::{accounting, companies};
use common::messages::{MessageType, QueueMessage, RequestSetToProcessingMessage};
use common::model::accounting::BilledRequest;
use log::info;
use rust_decimal::Decimal;

/// Handles `RequestSetToProcessing`. Returns whether a request was billed.
pub fn bill_request(ctx: ServiceContext<'_>, message: &QueueMessage) -> Result<bool, ApiError> {
    validate_message_type(message, &[MessageType::REQUEST_SET_TO_PROCESSING])?;
    let payload: RequestSetToProcessingMessage = read_payload(message)?;
    let memberships =
        companies::find_role_assignments(ctx.conn, Some(&payload.triggering_user_id), None)?;
    let Some(membership) = memberships.first() else {
        info!(
            "User '{}' belongs to no company, data sourcing request '{}' is not billed (correlation ID: {})",
            payload.triggering_user_id, payload.data_sourcing_id, message.correlation_id
        );
        return Ok(false);
    };
    if accounting::billed_request_exists(ctx.conn, &membership.company_id, &payload.data_sourcing_id)? {
        info!(
            "Data sourcing request '{}' was already billed to company '{}' (correlation ID: {})",
            payload.data_sourcing_id, membership.company_id, message.correlation_id
        );
        return Ok(false);
    }
    accounting::insert_billed_request(
        ctx.conn,
        &BilledRequest {
            billed_company_id: membership.company_id.clone(),
            data_sourcing_id: payload.data_sourcing_id,
            requested_company_id: payload.requested_company_id,
            requested_reporting_period: payload.requested_reporting_period,
            requested_framework: payload.requested_framework,
            debt: Decimal::new(10, 1),
        },
    )?;
    info!(
        "Billed one credit to company '{}' (correlation ID: {})",
        membership.company_id, message.correlation_id
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, COMPANY_ID};
    use common::messages::RoutingKeys;
    use common::model::company::{CompanyRole, CompanyRoleAssignment};

    fn request_message(user_id: &str, message_type: &str) -> QueueMessage {
        QueueMessage {
            message_type: message_type.to_string(),
            correlation_id: "c".to_string(),
            routing_key: RoutingKeys::DATA_SOURCING_PROCESSING.to_string(),
            payload: serde_json::to_string(&RequestSetToProcessingMessage {
                data_sourcing_id: "sourcing-1".to_string(),
                requested_company_id: "requested".to_string(),
                requested_reporting_period: "2023".to_string(),
                requested_framework: "sfdr".to_string(),
                triggering_user_id: user_id.to_string(),
            })
            .unwrap(),
        }
    }

    #[test]
    fn member_request_is_billed_once() {
        let setup = testing::setup();
        setup
            .state
            .transaction(|ctx| {
                companies::save_role_assignment(
                    ctx.conn,
                    &CompanyRoleAssignment {
                        company_role: CompanyRole::Member,
                        company_id: COMPANY_ID.to_string(),
                        user_id: "member".to_string(),
                    },
                )
            })
            .unwrap();
        let message = request_message("member", MessageType::REQUEST_SET_TO_PROCESSING);
        assert!(setup.state.transaction(|ctx| bill_request(ctx, &message)).unwrap());
        assert!(!setup.state.transaction(|ctx| bill_request(ctx, &message)).unwrap());
        let billed = setup
            .state
            .read(|ctx| accounting::find_billed_requests(ctx.conn, COMPANY_ID))
            .unwrap();
        assert_eq!(billed.len(), 1);
        assert_eq!(billed[0].debt, Decimal::ONE);
    }

    #[test]
    fn user_without_company_is_skipped() {
        let setup = testing::setup();
        let message = request_message("nobody", MessageType::REQUEST_SET_TO_PROCESSING);
        assert!(!setup.state.transaction(|ctx| bill_request(ctx, &message)).unwrap());
    }

    #[test]
    fn other_message_types_are_rejected() {
        let setup = testing::setup();
        let message = request_message("member", MessageType::DATASET_UPLOADED);
        assert!(matches!(
            setup.state.transaction(|ctx| bill_request(ctx, &message)),
            Err(ApiError::MessageQueueReject(_))
        ));
    }
}
