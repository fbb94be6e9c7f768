//! Regular order endpoints.

use api_types::{
    RepresentativeAssign,
    order::{OrderCollect, OrderNew, StatusUpdate},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Money, NewOrder, Order, OrderStatus};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Order>>, ServerError> {
    Ok(Json(state.engine.orders().await?))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, ServerError> {
    Ok(Json(state.engine.order(order_id).await?))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderNew>,
) -> Result<(StatusCode, Json<Order>), ServerError> {
    let mut cmd = NewOrder::new(
        payload.customer_name,
        Money::new(payload.selling_price_lyd_minor),
    )
    .down_payment(Money::new(payload.down_payment_lyd_minor));
    if let Some(customer_id) = payload.customer_id {
        cmd = cmd.customer_id(customer_id);
    }
    if let Some(tracking_number) = payload.tracking_number {
        cmd = cmd.tracking_number(tracking_number);
    }
    if let Some(representative_id) = payload.representative_id {
        cmd = cmd.representative(representative_id);
    }

    let order = state.engine.create_order(cmd).await?;
    tracing::info!(order_id = %order.id, "order created");
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update_status(
    State(state): State<ServerState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<StatusUpdate>,
) -> Result<Json<Order>, ServerError> {
    let status = OrderStatus::try_from(payload.status.as_str())?;
    let order = state.engine.update_order_status(order_id, status).await?;
    tracing::info!(%order_id, %status, "order status changed");
    Ok(Json(order))
}

pub async fn assign_representative(
    State(state): State<ServerState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<RepresentativeAssign>,
) -> Result<Json<Order>, ServerError> {
    let order = state
        .engine
        .assign_order_representative(order_id, payload.representative_id)
        .await?;
    Ok(Json(order))
}

pub async fn collect(
    State(state): State<ServerState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<OrderCollect>,
) -> Result<Json<Order>, ServerError> {
    let order = state
        .engine
        .record_representative_payment(order_id, Money::new(payload.collected_amount_minor))
        .await?;
    tracing::info!(
        %order_id,
        collected = payload.collected_amount_minor,
        "order delivered and collected"
    );
    Ok(Json(order))
}
