//! Creditor ledger endpoints.

use api_types::{LedgerReportRequest, debt::DebtNew};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{ExternalDebt, LedgerReport, Money, NewExternalDebt};
use uuid::Uuid;

use crate::{ServerError, account_type, ledger_filter, occurred_at, server::ServerState};

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<ExternalDebt>>, ServerError> {
    Ok(Json(state.engine.all_external_debts().await?))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DebtNew>,
) -> Result<(StatusCode, Json<ExternalDebt>), ServerError> {
    let mut cmd = NewExternalDebt::new(
        payload.creditor_id,
        Money::new(payload.amount_minor),
        occurred_at(payload.occurred_at),
    )
    .account_type(account_type(payload.account_type)?);
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }

    let debt = state.engine.add_external_debt(cmd).await?;
    tracing::info!(
        debt_id = %debt.id,
        creditor_id = %debt.creditor_id,
        amount = %debt.amount,
        "debt entry recorded"
    );
    Ok((StatusCode::CREATED, Json(debt)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(debt_id): Path<Uuid>,
) -> Result<Json<ExternalDebt>, ServerError> {
    let debt = state.engine.delete_external_debt(debt_id).await?;
    tracing::info!(%debt_id, creditor_id = %debt.creditor_id, "debt entry deleted");
    Ok(Json(debt))
}

pub async fn report(
    State(state): State<ServerState>,
    Json(payload): Json<LedgerReportRequest>,
) -> Result<Json<LedgerReport<ExternalDebt>>, ServerError> {
    let filter = ledger_filter(payload)?;
    Ok(Json(state.engine.creditor_report(&filter).await?))
}
