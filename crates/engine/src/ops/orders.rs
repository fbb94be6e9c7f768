use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, Money, NewOrder, Order, OrderStatus, ResultEngine, orders,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, representative_name, with_tx};

impl Engine {
    /// Return all regular orders, newest first.
    pub async fn orders(&self) -> ResultEngine<Vec<Order>> {
        let models = orders::Entity::find()
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(Order::try_from).collect()
    }

    /// Return an order snapshot from DB.
    pub async fn order(&self, order_id: Uuid) -> ResultEngine<Order> {
        load_order(&self.database, order_id).await
    }

    /// Create a regular order in `pending`.
    pub async fn create_order(&self, cmd: NewOrder) -> ResultEngine<Order> {
        let customer_name = normalize_required_name(&cmd.customer_name, "customer")?;
        if cmd.selling_price_lyd.is_negative() {
            return Err(EngineError::InvalidAmount(
                "selling price must be >= 0".to_string(),
            ));
        }
        cmd.selling_price_lyd.ensure_within_limit()?;
        if cmd.down_payment_lyd.is_negative() || cmd.down_payment_lyd > cmd.selling_price_lyd {
            return Err(EngineError::InvalidAmount(
                "down payment must be between 0 and the selling price".to_string(),
            ));
        }

        let created_at = Utc::now();
        with_tx!(self, |db_tx| {
            let order = Order {
                id: Uuid::new_v4(),
                customer_id: normalize_optional_text(cmd.customer_id.as_deref()),
                customer_name,
                tracking_number: normalize_optional_text(cmd.tracking_number.as_deref()),
                selling_price_lyd: cmd.selling_price_lyd,
                remaining_amount: cmd.selling_price_lyd - cmd.down_payment_lyd,
                collected_amount: None,
                status: OrderStatus::Pending,
                representative_id: cmd.representative_id,
                representative_name: representative_name(&db_tx, cmd.representative_id).await?,
                delivery_date: None,
                temp_order_id: None,
                created_at,
            };
            orders::ActiveModel::from(&order).insert(&db_tx).await?;
            Ok(order)
        })
    }

    /// Move an order along the shipping pipeline.
    ///
    /// Reaching `delivered` stamps the delivery date.
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> ResultEngine<Order> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let mut order = load_order(&db_tx, order_id).await?;
            let from = order.status;
            order.status = order.status.transition(status)?;
            if order.status == OrderStatus::Delivered {
                order.delivery_date = Some(now);
            }

            save_status(
                &db_tx,
                order.id,
                from,
                orders::ActiveModel {
                    status: ActiveValue::Set(order.status.as_str().to_string()),
                    delivery_date: ActiveValue::Set(order.delivery_date),
                    ..Default::default()
                },
            )
            .await?;

            Ok(order)
        })
    }

    /// Assign (or clear) the representative delivering an open order.
    pub async fn assign_order_representative(
        &self,
        order_id: Uuid,
        representative_id: Option<Uuid>,
    ) -> ResultEngine<Order> {
        with_tx!(self, |db_tx| {
            let mut order = load_order(&db_tx, order_id).await?;
            if order.status.is_terminal() {
                return Err(EngineError::InvalidInput(format!(
                    "order is already {}",
                    order.status
                )));
            }
            order.representative_name = representative_name(&db_tx, representative_id).await?;
            order.representative_id = representative_id;

            orders::ActiveModel {
                id: ActiveValue::Set(order.id.to_string()),
                representative_id: ActiveValue::Set(representative_id.map(|id| id.to_string())),
                representative_name: ActiveValue::Set(order.representative_name.clone()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Ok(order)
        })
    }

    /// Orders assigned to a representative, newest first.
    pub async fn orders_by_representative(
        &self,
        representative_id: Uuid,
    ) -> ResultEngine<Vec<Order>> {
        representative_name(&self.database, Some(representative_id)).await?;
        let models = orders::Entity::find()
            .filter(orders::Column::RepresentativeId.eq(representative_id.to_string()))
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(Order::try_from).collect()
    }

    /// A representative hands over the cash collected on delivery.
    ///
    /// Delivers the order, records `collected_amount` and clears the
    /// remaining balance in one step.
    pub async fn record_representative_payment(
        &self,
        order_id: Uuid,
        collected_amount: Money,
    ) -> ResultEngine<Order> {
        if collected_amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "collected amount must be >= 0".to_string(),
            ));
        }
        collected_amount.ensure_within_limit()?;
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let mut order = load_order(&db_tx, order_id).await?;
            if order.representative_id.is_none() {
                return Err(EngineError::InvalidInput(
                    "order has no representative".to_string(),
                ));
            }
            let from = order.status;
            order.status = order.status.transition(OrderStatus::Delivered)?;
            order.collected_amount = Some(collected_amount);
            order.delivery_date = Some(now);
            order.remaining_amount = Money::ZERO;

            save_status(
                &db_tx,
                order.id,
                from,
                orders::ActiveModel {
                    status: ActiveValue::Set(order.status.as_str().to_string()),
                    collected_amount_minor: ActiveValue::Set(Some(collected_amount.minor())),
                    delivery_date: ActiveValue::Set(order.delivery_date),
                    remaining_amount_minor: ActiveValue::Set(0),
                    ..Default::default()
                },
            )
            .await?;

            Ok(order)
        })
    }
}

/// Applies `changes` only if the order is still in `from`, so two racing
/// transitions cannot both land.
async fn save_status<C: ConnectionTrait>(
    db: &C,
    order_id: Uuid,
    from: OrderStatus,
    changes: orders::ActiveModel,
) -> ResultEngine<()> {
    let result = orders::Entity::update_many()
        .set(changes)
        .filter(orders::Column::Id.eq(order_id.to_string()))
        .filter(orders::Column::Status.eq(from.as_str()))
        .exec(db)
        .await?;
    if result.rows_affected != 1 {
        return Err(EngineError::Conflict(
            "order status changed, update not applied".to_string(),
        ));
    }
    Ok(())
}

async fn load_order<C: ConnectionTrait>(db: &C, order_id: Uuid) -> ResultEngine<Order> {
    let model = orders::Entity::find_by_id(order_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("order not exists".to_string()))?;
    Order::try_from(model)
}
