use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::state::ServiceContext;
use crate::storage::{accounting, companies, now_millis};
use common::model::accounting::{BalanceResponse, BilledRequest, CreditTransaction};
use log::info;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

/// Admins see every company, everybody else only the companies they belong to.
fn ensure_company_visible(
    ctx: ServiceContext<'_>,
    company_id: &str,
    user: &AuthenticatedUser,
) -> Result<(), ApiError> {
    if user.is_admin()
        || !companies::find_role_assignments(ctx.conn, Some(&user.user_id), Some(company_id))?
            .is_empty()
    {
        return Ok(());
    }
    Err(ApiError::insufficient_rights(
        "Insufficient rights",
        format!("You are not a member of the company '{company_id}'."),
    ))
}

pub fn post_credit_transaction(
    ctx: ServiceContext<'_>,
    company_id: &str,
    amount: Decimal,
    reason: &str,
    user: &AuthenticatedUser,
) -> Result<CreditTransaction, ApiError> {
    user.require(Role::Admin)?;
    let transaction = CreditTransaction {
        transaction_id: Uuid::new_v4().to_string(),
        company_id: company_id.to_string(),
        amount,
        reason: reason.to_string(),
        triggering_user_id: user.user_id.clone(),
        timestamp: now_millis(),
    };
    accounting::insert_transaction(ctx.conn, &transaction)?;
    info!("Booked {} credits for company '{}'", amount, company_id);
    Ok(transaction)
}

/// Sum of all transactions minus all debts, rounded half-up to one decimal place.
pub fn compute_balance(transactions: &[CreditTransaction], billed_requests: &[BilledRequest]) -> Decimal {
    let credits: Decimal = transactions.iter().map(|transaction| transaction.amount).sum();
    let debts: Decimal = billed_requests.iter().map(|request| request.debt).sum();
    (credits - debts).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

pub fn get_balance(
    ctx: ServiceContext<'_>,
    company_id: &str,
    user: &AuthenticatedUser,
) -> Result<BalanceResponse, ApiError> {
    ensure_company_visible(ctx, company_id, user)?;
    let transactions = accounting::find_transactions(ctx.conn, company_id)?;
    let billed_requests = accounting::find_billed_requests(ctx.conn, company_id)?;
    Ok(BalanceResponse {
        company_id: company_id.to_string(),
        balance: compute_balance(&transactions, &billed_requests),
    })
}

pub fn list_transactions(
    ctx: ServiceContext<'_>,
    company_id: &str,
    user: &AuthenticatedUser,
) -> Result<Vec<CreditTransaction>, ApiError> {
    ensure_company_visible(ctx, company_id, user)?;
    accounting::find_transactions(ctx.conn, company_id)
}

pub fn list_billed_requests(
    ctx: ServiceContext<'_>,
    company_id: &str,
    user: &AuthenticatedUser,
) -> Result<Vec<BilledRequest>, ApiError> {
    ensure_company_visible(ctx, company_id, user)?;
    accounting::find_billed_requests(ctx.conn, company_id)
}
