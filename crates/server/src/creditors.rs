//! Creditors API endpoints.

use api_types::creditor::{CreditorNew, CreditorTotal, CreditorUpdate};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Balances, Creditor, CreditorKind, Currency, ExternalDebt, Money, NewCreditor};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Creditor>>, ServerError> {
    Ok(Json(state.engine.creditors().await?))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(creditor_id): Path<Uuid>,
) -> Result<Json<Creditor>, ServerError> {
    Ok(Json(state.engine.creditor(creditor_id).await?))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreditorNew>,
) -> Result<(StatusCode, Json<Creditor>), ServerError> {
    let mut cmd = NewCreditor::new(payload.name);
    if let Some(kind) = payload.kind {
        cmd = cmd.kind(CreditorKind::try_from(kind.as_str())?);
    }
    if let Some(currency) = payload.currency {
        cmd = cmd.currency(Currency::try_from(currency.as_str())?);
    }
    if let Some(phone) = payload.phone {
        cmd = cmd.phone(phone);
    }

    let creditor = state
        .engine
        .add_creditor(cmd, Money::new(payload.initial_balance_minor))
        .await?;
    tracing::info!(creditor_id = %creditor.id, "creditor created");
    Ok((StatusCode::CREATED, Json(creditor)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(creditor_id): Path<Uuid>,
    Json(payload): Json<CreditorUpdate>,
) -> Result<Json<Creditor>, ServerError> {
    if payload.name.is_none()
        && payload.kind.is_none()
        && payload.phone.is_none()
        && payload.currency.is_none()
    {
        return Err(ServerError::Generic(
            "provide at least one of name, kind, phone or currency".to_string(),
        ));
    }

    let update = engine::CreditorUpdate {
        name: payload.name,
        kind: payload
            .kind
            .map(|kind| CreditorKind::try_from(kind.as_str()))
            .transpose()?,
        phone: payload.phone,
        currency: payload
            .currency
            .map(|currency| Currency::try_from(currency.as_str()))
            .transpose()?,
    };
    let creditor = state.engine.update_creditor(creditor_id, update).await?;
    Ok(Json(creditor))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(creditor_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_creditor(creditor_id).await?;
    tracing::info!(%creditor_id, "creditor deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn balance(
    State(state): State<ServerState>,
    Path(creditor_id): Path<Uuid>,
) -> Result<Json<Balances>, ServerError> {
    Ok(Json(state.engine.creditor_balance(creditor_id).await?))
}

pub async fn recompute(
    State(state): State<ServerState>,
    Path(creditor_id): Path<Uuid>,
) -> Result<Json<CreditorTotal>, ServerError> {
    let total = state.engine.recompute_creditor_total(creditor_id).await?;
    tracing::info!(%creditor_id, total = %total, "creditor total recomputed");
    Ok(Json(CreditorTotal {
        creditor_id,
        total_debt_minor: total.minor(),
    }))
}

pub async fn debts(
    State(state): State<ServerState>,
    Path(creditor_id): Path<Uuid>,
) -> Result<Json<Vec<ExternalDebt>>, ServerError> {
    Ok(Json(state.engine.external_debts_for(creditor_id).await?))
}
