//! Deposit endpoints.

use api_types::deposit::{DepositNew, DepositStatusUpdate, DepositUpdate};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Deposit, DepositStatus, Money, NewDeposit};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Deposit>>, ServerError> {
    Ok(Json(state.engine.deposits().await?))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(deposit_id): Path<Uuid>,
) -> Result<Json<Deposit>, ServerError> {
    Ok(Json(state.engine.deposit(deposit_id).await?))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DepositNew>,
) -> Result<(StatusCode, Json<Deposit>), ServerError> {
    let mut cmd = NewDeposit::new(payload.customer_name, Money::new(payload.amount_minor));
    if let Some(phone) = payload.customer_phone {
        cmd = cmd.phone(phone);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(representative_id) = payload.representative_id {
        cmd = cmd.representative(representative_id);
    }

    let deposit = state.engine.add_deposit(cmd).await?;
    tracing::info!(deposit_id = %deposit.id, amount = %deposit.amount, "deposit created");
    Ok((StatusCode::CREATED, Json(deposit)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(deposit_id): Path<Uuid>,
    Json(payload): Json<DepositUpdate>,
) -> Result<Json<Deposit>, ServerError> {
    let representative_id = match (payload.representative_id, payload.clear_representative) {
        (Some(id), _) => Some(Some(id)),
        (None, true) => Some(None),
        (None, false) => None,
    };
    let update = engine::DepositUpdate {
        customer_name: payload.customer_name,
        customer_phone: payload.customer_phone,
        amount: payload.amount_minor.map(Money::new),
        description: payload.description,
        representative_id,
    };
    Ok(Json(state.engine.update_deposit(deposit_id, update).await?))
}

pub async fn update_status(
    State(state): State<ServerState>,
    Path(deposit_id): Path<Uuid>,
    Json(payload): Json<DepositStatusUpdate>,
) -> Result<Json<Deposit>, ServerError> {
    let status = DepositStatus::try_from(payload.status.as_str())?;
    let deposit = state.engine.update_deposit_status(deposit_id, status).await?;
    tracing::info!(%deposit_id, status = status.as_str(), "deposit status changed");
    Ok(Json(deposit))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(deposit_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_deposit(deposit_id).await?;
    tracing::info!(%deposit_id, "deposit deleted");
    Ok(StatusCode::NO_CONTENT)
}
