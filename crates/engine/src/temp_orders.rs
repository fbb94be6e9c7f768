//! Temporary batch orders and their settlement rules.
//!
//! A [`TempOrder`] groups the [`SubOrder`]s of one invoice. Its totals are
//! derived from the sub-orders:
//!
//! - `total_amount == Σ sub_order.selling_price_lyd`
//! - `remaining_amount == Σ sub_order.remaining_amount`
//!
//! Payments only ever reduce a sub-order's remaining amount, and a payment
//! larger than what is left is rejected rather than clamped.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Money, NewTempOrder, OrderStatus, ResultEngine, SubOrder,
    util::{normalize_optional_text, normalize_required_name, parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempOrder {
    pub id: Uuid,
    pub invoice_name: String,
    pub total_amount: Money,
    pub remaining_amount: Money,
    pub status: OrderStatus,
    /// When set, the debt belongs to a registered customer instead of an
    /// anonymous batch customer.
    pub assigned_user_id: Option<String>,
    pub assigned_user_name: Option<String>,
    /// Regular order this batch was converted into. A converted batch is
    /// closed for payments and edits.
    pub parent_invoice_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub sub_orders: Vec<SubOrder>,
}

impl TempOrder {
    /// Validates `cmd` and builds a new pending batch.
    pub fn create(cmd: NewTempOrder, created_at: DateTime<Utc>) -> ResultEngine<Self> {
        let invoice_name = normalize_required_name(&cmd.invoice_name, "invoice")?;
        if cmd.sub_orders.is_empty() {
            return Err(EngineError::InvalidInput(
                "a temp order needs at least one sub order".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let mut sub_orders = Vec::with_capacity(cmd.sub_orders.len());
        for line in cmd.sub_orders {
            let customer_name = normalize_required_name(&line.customer_name, "customer")?;
            if line.selling_price_lyd.is_negative() || line.purchase_price_usd.is_negative() {
                return Err(EngineError::InvalidAmount(format!(
                    "prices must be >= 0 for '{customer_name}'"
                )));
            }
            line.selling_price_lyd.ensure_within_limit()?;
            line.purchase_price_usd.ensure_within_limit()?;
            if line.down_payment_lyd.is_negative() || line.down_payment_lyd > line.selling_price_lyd
            {
                return Err(EngineError::InvalidAmount(format!(
                    "down payment must be between 0 and the selling price for '{customer_name}'"
                )));
            }
            sub_orders.push(SubOrder {
                id: Uuid::new_v4(),
                temp_order_id: id,
                customer_name,
                customer_phone: normalize_optional_text(line.customer_phone.as_deref()),
                customer_address: normalize_optional_text(line.customer_address.as_deref()),
                purchase_price_usd: line.purchase_price_usd,
                selling_price_lyd: line.selling_price_lyd,
                down_payment_lyd: line.down_payment_lyd,
                remaining_amount: line.selling_price_lyd - line.down_payment_lyd,
                status: OrderStatus::Pending,
                representative_id: line.representative_id,
                representative_name: None,
            });
        }

        let mut order = Self {
            id,
            invoice_name,
            total_amount: Money::ZERO,
            remaining_amount: Money::ZERO,
            status: OrderStatus::Pending,
            assigned_user_id: normalize_optional_text(cmd.assigned_user_id.as_deref()),
            assigned_user_name: normalize_optional_text(cmd.assigned_user_name.as_deref()),
            parent_invoice_id: None,
            created_at,
            sub_orders,
        };
        order.recompute_totals()?;
        Ok(order)
    }

    #[must_use]
    pub fn is_converted(&self) -> bool {
        self.parent_invoice_id.is_some()
    }

    /// Name the batch is billed under.
    #[must_use]
    pub fn customer_name(&self) -> &str {
        self.assigned_user_name
            .as_deref()
            .unwrap_or(&self.invoice_name)
    }

    pub fn ensure_open(&self) -> ResultEngine<()> {
        if self.is_converted() {
            return Err(EngineError::InvalidInput(format!(
                "temp order '{}' was already converted",
                self.invoice_name
            )));
        }
        Ok(())
    }

    pub fn sub_order(&self, sub_order_id: Uuid) -> ResultEngine<&SubOrder> {
        self.sub_orders
            .iter()
            .find(|s| s.id == sub_order_id)
            .ok_or_else(|| EngineError::KeyNotFound("sub order not exists".to_string()))
    }

    /// Re-derives the batch totals from the sub-orders.
    ///
    /// Fails with `InvalidAmount`, leaving the totals untouched, when a sum
    /// leaves the supported money range.
    pub fn recompute_totals(&mut self) -> ResultEngine<()> {
        let total_amount = Money::try_sum(self.sub_orders.iter().map(|s| s.selling_price_lyd))?;
        let remaining_amount =
            Money::try_sum(self.sub_orders.iter().map(|s| s.remaining_amount))?;
        self.total_amount = total_amount;
        self.remaining_amount = remaining_amount;
        Ok(())
    }

    /// Applies a payment to one sub-order and refreshes the batch totals.
    ///
    /// Nothing is modified when an error is returned. On success the
    /// sub-order's new remaining amount is returned.
    pub fn apply_payment(&mut self, sub_order_id: Uuid, amount: Money) -> ResultEngine<Money> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "payment amount must be > 0".to_string(),
            ));
        }
        self.ensure_open()?;

        let sub_order = self
            .sub_orders
            .iter_mut()
            .find(|s| s.id == sub_order_id)
            .ok_or_else(|| EngineError::KeyNotFound("sub order not exists".to_string()))?;
        if sub_order.is_paid() {
            return Err(EngineError::InvalidInput(format!(
                "sub order for '{}' is already fully paid",
                sub_order.customer_name
            )));
        }
        if amount > sub_order.remaining_amount {
            return Err(EngineError::Overpayment(format!(
                "payment of {amount} exceeds remaining {}",
                sub_order.remaining_amount
            )));
        }

        sub_order.remaining_amount -= amount;
        let remaining = sub_order.remaining_amount;
        self.recompute_totals()?;
        Ok(remaining)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "temp_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub invoice_name: String,
    pub total_amount_minor: i64,
    pub remaining_amount_minor: i64,
    pub status: String,
    pub assigned_user_id: Option<String>,
    pub assigned_user_name: Option<String>,
    pub parent_invoice_id: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sub_orders::Entity")]
    SubOrders,
}

impl Related<super::sub_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TempOrder> for ActiveModel {
    fn from(value: &TempOrder) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            invoice_name: ActiveValue::Set(value.invoice_name.clone()),
            total_amount_minor: ActiveValue::Set(value.total_amount.minor()),
            remaining_amount_minor: ActiveValue::Set(value.remaining_amount.minor()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            assigned_user_id: ActiveValue::Set(value.assigned_user_id.clone()),
            assigned_user_name: ActiveValue::Set(value.assigned_user_name.clone()),
            parent_invoice_id: ActiveValue::Set(value.parent_invoice_id.map(|id| id.to_string())),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<(Model, Vec<SubOrder>)> for TempOrder {
    type Error = EngineError;

    fn try_from((model, sub_orders): (Model, Vec<SubOrder>)) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "temp order")?,
            invoice_name: model.invoice_name,
            total_amount: Money::new(model.total_amount_minor),
            remaining_amount: Money::new(model.remaining_amount_minor),
            status: OrderStatus::try_from(model.status.as_str())?,
            assigned_user_id: model.assigned_user_id,
            assigned_user_name: model.assigned_user_name,
            parent_invoice_id: parse_optional_uuid(model.parent_invoice_id.as_deref(), "order")?,
            created_at: model.created_at,
            sub_orders,
        })
    }
}
