//! Representative endpoints: assignments, collections and the financial log.

use api_types::representative::{LogPeriod, LogRequest, RepresentativeNew};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{
    DateRange, Deposit, FinancialLog, LogFilter, NewRepresentative, Order, Period,
    Representative, RepresentativeSummary, SubOrder,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<Representative>>, ServerError> {
    Ok(Json(state.engine.representatives().await?))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(representative_id): Path<Uuid>,
) -> Result<Json<Representative>, ServerError> {
    Ok(Json(state.engine.representative(representative_id).await?))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<RepresentativeNew>,
) -> Result<(StatusCode, Json<Representative>), ServerError> {
    let mut cmd = NewRepresentative::new(payload.name);
    if let Some(phone) = payload.phone {
        cmd = cmd.phone(phone);
    }
    let representative = state.engine.add_representative(cmd).await?;
    tracing::info!(representative_id = %representative.id, "representative created");
    Ok((StatusCode::CREATED, Json(representative)))
}

pub async fn orders(
    State(state): State<ServerState>,
    Path(representative_id): Path<Uuid>,
) -> Result<Json<Vec<Order>>, ServerError> {
    Ok(Json(
        state
            .engine
            .orders_by_representative(representative_id)
            .await?,
    ))
}

pub async fn deposits(
    State(state): State<ServerState>,
    Path(representative_id): Path<Uuid>,
) -> Result<Json<Vec<Deposit>>, ServerError> {
    Ok(Json(
        state
            .engine
            .deposits_by_representative(representative_id)
            .await?,
    ))
}

pub async fn sub_orders(
    State(state): State<ServerState>,
    Path(representative_id): Path<Uuid>,
) -> Result<Json<Vec<SubOrder>>, ServerError> {
    Ok(Json(
        state
            .engine
            .temp_sub_orders_by_representative(representative_id)
            .await?,
    ))
}

pub async fn summary(
    State(state): State<ServerState>,
    Path(representative_id): Path<Uuid>,
) -> Result<Json<RepresentativeSummary>, ServerError> {
    Ok(Json(
        state.engine.representative_summary(representative_id).await?,
    ))
}

pub async fn log(
    State(state): State<ServerState>,
    Path(representative_id): Path<Uuid>,
    Json(payload): Json<LogRequest>,
) -> Result<Json<FinancialLog>, ServerError> {
    let period = match payload.period {
        LogPeriod::All => Period::All,
        LogPeriod::Daily => Period::Daily,
        LogPeriod::Weekly => Period::Weekly,
        LogPeriod::Monthly => Period::Monthly,
        LogPeriod::Yearly => Period::Yearly,
        LogPeriod::Custom => {
            let (Some(from), Some(to)) = (payload.from, payload.to) else {
                return Err(ServerError::Generic(
                    "custom period needs both from and to".to_string(),
                ));
            };
            Period::Custom {
                range: DateRange::new(from, to)?,
            }
        }
    };
    let filter = LogFilter {
        period,
        text: payload.text,
    };
    let today = Utc::now().date_naive();
    Ok(Json(
        state
            .engine
            .representative_financial_log(representative_id, &filter, today)
            .await?,
    ))
}

pub async fn collect_deposit(
    State(state): State<ServerState>,
    Path((representative_id, deposit_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Deposit>, ServerError> {
    let deposit = state
        .engine
        .confirm_deposit_collection(deposit_id, representative_id)
        .await?;
    tracing::info!(%representative_id, %deposit_id, "deposit collected");
    Ok(Json(deposit))
}
