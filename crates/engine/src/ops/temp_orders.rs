use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    CustomerTransaction, EngineError, NewTempOrder, Order, OrderStatus, ResultEngine, SubOrder,
    TempOrder, TempOrderPayment, TempOrderUpdate, customer_transactions, orders, sub_orders,
    temp_customer_id, temp_orders,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, representative_name, with_tx};

impl Engine {
    /// Return every temporary order with its sub-orders, newest first.
    pub async fn temp_orders(&self) -> ResultEngine<Vec<TempOrder>> {
        let models = temp_orders::Entity::find()
            .order_by_desc(temp_orders::Column::CreatedAt)
            .all(&self.database)
            .await?;

        let mut lines: HashMap<String, Vec<SubOrder>> = HashMap::new();
        let sub_models = sub_orders::Entity::find()
            .order_by_asc(sub_orders::Column::Position)
            .all(&self.database)
            .await?;
        for model in sub_models {
            let key = model.temp_order_id.clone();
            lines.entry(key).or_default().push(SubOrder::try_from(model)?);
        }

        models
            .into_iter()
            .map(|model| {
                let sub_orders = lines.remove(&model.id).unwrap_or_default();
                TempOrder::try_from((model, sub_orders))
            })
            .collect()
    }

    /// Return a temporary order snapshot from DB.
    pub async fn temp_order(&self, temp_order_id: Uuid) -> ResultEngine<TempOrder> {
        load_temp_order(&self.database, temp_order_id).await
    }

    /// Create a temporary batch order with its sub-orders.
    pub async fn create_temp_order(&self, cmd: NewTempOrder) -> ResultEngine<TempOrder> {
        let mut order = TempOrder::create(cmd, Utc::now())?;
        with_tx!(self, |db_tx| {
            for sub_order in &mut order.sub_orders {
                sub_order.representative_name =
                    representative_name(&db_tx, sub_order.representative_id).await?;
            }

            temp_orders::ActiveModel::from(&order)
                .insert(&db_tx)
                .await?;
            for (position, sub_order) in (0_i32..).zip(&order.sub_orders) {
                sub_orders::ActiveModel::from((sub_order, position))
                    .insert(&db_tx)
                    .await?;
            }
            Ok(order)
        })
    }

    /// Record a payment against one sub-order.
    ///
    /// The payment is previewed on the loaded order first, so every
    /// validation error is returned before anything is written. The write
    /// itself is a guarded decrement that only succeeds while the sub-order
    /// still has at least `amount` left.
    pub async fn apply_payment(&self, payment: TempOrderPayment) -> ResultEngine<TempOrder> {
        with_tx!(self, |db_tx| {
            let mut order = load_temp_order(&db_tx, payment.temp_order_id).await?;
            order.apply_payment(payment.sub_order_id, payment.amount)?;

            let amount_minor = payment.amount.minor();
            let result = sub_orders::Entity::update_many()
                .col_expr(
                    sub_orders::Column::RemainingAmountMinor,
                    Expr::col(sub_orders::Column::RemainingAmountMinor).sub(amount_minor),
                )
                .filter(sub_orders::Column::Id.eq(payment.sub_order_id.to_string()))
                .filter(sub_orders::Column::TempOrderId.eq(payment.temp_order_id.to_string()))
                .filter(sub_orders::Column::RemainingAmountMinor.gte(amount_minor))
                .exec(&db_tx)
                .await?;
            if result.rows_affected != 1 {
                return Err(EngineError::Conflict(
                    "sub order balance changed, payment not applied".to_string(),
                ));
            }

            let order = refresh_remaining(&db_tx, payment.temp_order_id).await?;

            let description = normalize_optional_text(payment.notes.as_deref())
                .unwrap_or_else(|| format!("payment for {}", order.invoice_name));
            let transaction = CustomerTransaction {
                id: Uuid::new_v4(),
                customer_id: temp_customer_id(order.id),
                customer_name: order.customer_name().to_string(),
                amount: payment.amount.try_neg()?,
                account_type: payment.account_type,
                description,
                date: payment.date,
            };
            customer_transactions::ActiveModel::from(&transaction)
                .insert(&db_tx)
                .await?;

            Ok(order)
        })
    }

    /// Edit the invoice name, status or assigned customer of an open batch.
    pub async fn update_temp_order(
        &self,
        temp_order_id: Uuid,
        update: TempOrderUpdate,
    ) -> ResultEngine<TempOrder> {
        let invoice_name = update
            .invoice_name
            .as_deref()
            .map(|name| normalize_required_name(name, "invoice"))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let mut order = load_temp_order(&db_tx, temp_order_id).await?;
            order.ensure_open()?;

            if let Some(name) = invoice_name {
                order.invoice_name = name;
            }
            if let Some(status) = update.status {
                order.status = order.status.transition(status)?;
            }
            if let Some(user_id) = update.assigned_user_id.as_deref() {
                order.assigned_user_id = normalize_optional_text(Some(user_id));
            }
            if let Some(user_name) = update.assigned_user_name.as_deref() {
                order.assigned_user_name = normalize_optional_text(Some(user_name));
            }

            temp_orders::ActiveModel {
                id: ActiveValue::Set(order.id.to_string()),
                invoice_name: ActiveValue::Set(order.invoice_name.clone()),
                status: ActiveValue::Set(order.status.as_str().to_string()),
                assigned_user_id: ActiveValue::Set(order.assigned_user_id.clone()),
                assigned_user_name: ActiveValue::Set(order.assigned_user_name.clone()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Ok(order)
        })
    }

    /// Turn a batch into a regular order carrying its totals.
    ///
    /// The batch keeps a link to the new order and is closed afterwards.
    pub async fn convert_temp_order(&self, temp_order_id: Uuid) -> ResultEngine<Order> {
        let created_at = Utc::now();
        with_tx!(self, |db_tx| {
            let temp = load_temp_order(&db_tx, temp_order_id).await?;
            temp.ensure_open()?;
            if temp.status == OrderStatus::Cancelled {
                return Err(EngineError::InvalidTransition(format!(
                    "temp order '{}' is cancelled",
                    temp.invoice_name
                )));
            }

            let order = Order {
                id: Uuid::new_v4(),
                customer_id: temp.assigned_user_id.clone(),
                customer_name: temp.customer_name().to_string(),
                tracking_number: None,
                selling_price_lyd: temp.total_amount,
                remaining_amount: temp.remaining_amount,
                collected_amount: None,
                status: temp.status,
                representative_id: None,
                representative_name: None,
                delivery_date: None,
                temp_order_id: Some(temp.id),
                created_at,
            };
            orders::ActiveModel::from(&order).insert(&db_tx).await?;

            temp_orders::ActiveModel {
                id: ActiveValue::Set(temp.id.to_string()),
                parent_invoice_id: ActiveValue::Set(Some(order.id.to_string())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Ok(order)
        })
    }

    /// Assign (or clear) the representative delivering one sub-order.
    pub async fn assign_sub_order_representative(
        &self,
        sub_order_id: Uuid,
        representative_id: Option<Uuid>,
    ) -> ResultEngine<SubOrder> {
        with_tx!(self, |db_tx| {
            let mut sub_order = self.open_sub_order(&db_tx, sub_order_id).await?;
            sub_order.representative_name = representative_name(&db_tx, representative_id).await?;
            sub_order.representative_id = representative_id;

            sub_orders::ActiveModel {
                id: ActiveValue::Set(sub_order.id.to_string()),
                representative_id: ActiveValue::Set(representative_id.map(|id| id.to_string())),
                representative_name: ActiveValue::Set(sub_order.representative_name.clone()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Ok(sub_order)
        })
    }

    /// Move one sub-order along the shipping pipeline.
    pub async fn update_sub_order_status(
        &self,
        sub_order_id: Uuid,
        status: OrderStatus,
    ) -> ResultEngine<SubOrder> {
        with_tx!(self, |db_tx| {
            let mut sub_order = self.open_sub_order(&db_tx, sub_order_id).await?;
            sub_order.status = sub_order.status.transition(status)?;

            sub_orders::ActiveModel {
                id: ActiveValue::Set(sub_order.id.to_string()),
                status: ActiveValue::Set(sub_order.status.as_str().to_string()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Ok(sub_order)
        })
    }

    /// Sub-orders assigned to a representative, across all batches.
    pub async fn temp_sub_orders_by_representative(
        &self,
        representative_id: Uuid,
    ) -> ResultEngine<Vec<SubOrder>> {
        representative_name(&self.database, Some(representative_id)).await?;
        let models = sub_orders::Entity::find()
            .filter(sub_orders::Column::RepresentativeId.eq(representative_id.to_string()))
            .order_by_asc(sub_orders::Column::TempOrderId)
            .order_by_asc(sub_orders::Column::Position)
            .all(&self.database)
            .await?;
        models.into_iter().map(SubOrder::try_from).collect()
    }

    /// Load a sub-order whose batch still accepts changes.
    async fn open_sub_order<C: ConnectionTrait>(
        &self,
        db: &C,
        sub_order_id: Uuid,
    ) -> ResultEngine<SubOrder> {
        let model = sub_orders::Entity::find_by_id(sub_order_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("sub order not exists".to_string()))?;
        let sub_order = SubOrder::try_from(model)?;
        load_temp_order(db, sub_order.temp_order_id)
            .await?
            .ensure_open()?;
        Ok(sub_order)
    }
}

async fn load_temp_order<C: ConnectionTrait>(db: &C, temp_order_id: Uuid) -> ResultEngine<TempOrder> {
    let model = temp_orders::Entity::find_by_id(temp_order_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("temp order not exists".to_string()))?;
    let sub_orders = sub_orders::Entity::find()
        .filter(sub_orders::Column::TempOrderId.eq(temp_order_id.to_string()))
        .order_by_asc(sub_orders::Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(SubOrder::try_from)
        .collect::<ResultEngine<Vec<_>>>()?;
    TempOrder::try_from((model, sub_orders))
}

/// Re-derive the batch remaining amount from the stored sub-orders.
async fn refresh_remaining<C: ConnectionTrait>(
    db: &C,
    temp_order_id: Uuid,
) -> ResultEngine<TempOrder> {
    let mut order = load_temp_order(db, temp_order_id).await?;
    order.recompute_totals()?;
    temp_orders::ActiveModel {
        id: ActiveValue::Set(order.id.to_string()),
        total_amount_minor: ActiveValue::Set(order.total_amount.minor()),
        remaining_amount_minor: ActiveValue::Set(order.remaining_amount.minor()),
        ..Default::default()
    }
    .update(db)
    .await?;
    Ok(order)
}
