//! Temporary batch order endpoints.

use api_types::{
    RepresentativeAssign,
    temp_order::{SubOrderStatusUpdate, TempOrderNew, TempOrderPayment, TempOrderUpdate},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Money, NewSubOrder, NewTempOrder, Order, OrderStatus, SubOrder, TempOrder};
use uuid::Uuid;

use crate::{ServerError, account_type, occurred_at, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<TempOrder>>, ServerError> {
    Ok(Json(state.engine.temp_orders().await?))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(temp_order_id): Path<Uuid>,
) -> Result<Json<TempOrder>, ServerError> {
    Ok(Json(state.engine.temp_order(temp_order_id).await?))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TempOrderNew>,
) -> Result<(StatusCode, Json<TempOrder>), ServerError> {
    let mut cmd = NewTempOrder::new(payload.invoice_name);
    cmd.assigned_user_id = payload.assigned_user_id;
    cmd.assigned_user_name = payload.assigned_user_name;
    for line in payload.sub_orders {
        let mut sub_order =
            NewSubOrder::new(line.customer_name, Money::new(line.selling_price_lyd_minor))
                .purchase_price_usd(Money::new(line.purchase_price_usd_minor))
                .down_payment(Money::new(line.down_payment_lyd_minor));
        sub_order.customer_phone = line.customer_phone;
        sub_order.customer_address = line.customer_address;
        sub_order.representative_id = line.representative_id;
        cmd = cmd.sub_order(sub_order);
    }

    let order = state.engine.create_temp_order(cmd).await?;
    tracing::info!(
        temp_order_id = %order.id,
        sub_orders = order.sub_orders.len(),
        total = %order.total_amount,
        "temp order created"
    );
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(temp_order_id): Path<Uuid>,
    Json(payload): Json<TempOrderUpdate>,
) -> Result<Json<TempOrder>, ServerError> {
    let update = engine::TempOrderUpdate {
        invoice_name: payload.invoice_name,
        status: payload
            .status
            .map(|status| OrderStatus::try_from(status.as_str()))
            .transpose()?,
        assigned_user_id: payload.assigned_user_id,
        assigned_user_name: payload.assigned_user_name,
    };
    Ok(Json(
        state.engine.update_temp_order(temp_order_id, update).await?,
    ))
}

pub async fn payment(
    State(state): State<ServerState>,
    Path(temp_order_id): Path<Uuid>,
    Json(payload): Json<TempOrderPayment>,
) -> Result<Json<TempOrder>, ServerError> {
    let mut cmd = engine::TempOrderPayment::new(
        temp_order_id,
        payload.sub_order_id,
        Money::new(payload.amount_minor),
        occurred_at(payload.occurred_at),
    )
    .account_type(account_type(payload.account_type)?);
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }

    let order = state.engine.apply_payment(cmd).await?;
    tracing::info!(
        %temp_order_id,
        sub_order_id = %payload.sub_order_id,
        amount = payload.amount_minor,
        remaining = %order.remaining_amount,
        "temp order payment recorded"
    );
    Ok(Json(order))
}

pub async fn convert(
    State(state): State<ServerState>,
    Path(temp_order_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Order>), ServerError> {
    let order = state.engine.convert_temp_order(temp_order_id).await?;
    tracing::info!(%temp_order_id, order_id = %order.id, "temp order converted");
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn assign_representative(
    State(state): State<ServerState>,
    Path(sub_order_id): Path<Uuid>,
    Json(payload): Json<RepresentativeAssign>,
) -> Result<Json<SubOrder>, ServerError> {
    let sub_order = state
        .engine
        .assign_sub_order_representative(sub_order_id, payload.representative_id)
        .await?;
    Ok(Json(sub_order))
}

pub async fn update_status(
    State(state): State<ServerState>,
    Path(sub_order_id): Path<Uuid>,
    Json(payload): Json<SubOrderStatusUpdate>,
) -> Result<Json<SubOrder>, ServerError> {
    let status = OrderStatus::try_from(payload.status.as_str())?;
    let sub_order = state
        .engine
        .update_sub_order_status(sub_order_id, status)
        .await?;
    tracing::info!(%sub_order_id, %status, "sub order status changed");
    Ok(Json(sub_order))
}
