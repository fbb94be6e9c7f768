//! One customer's line inside a temporary batch order.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Money, OrderStatus,
    util::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubOrder {
    pub id: Uuid,
    pub temp_order_id: Uuid,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub purchase_price_usd: Money,
    pub selling_price_lyd: Money,
    pub down_payment_lyd: Money,
    /// `selling_price_lyd - down_payment_lyd - payments so far`. Never
    /// increases and never drops below zero.
    pub remaining_amount: Money,
    pub status: OrderStatus,
    pub representative_id: Option<Uuid>,
    pub representative_name: Option<String>,
}

impl SubOrder {
    #[must_use]
    pub fn is_paid(&self) -> bool {
        !self.remaining_amount.is_positive()
    }

    /// Total of the payments recorded after the down payment.
    #[must_use]
    pub fn paid_after_down_payment(&self) -> Money {
        self.selling_price_lyd - self.down_payment_lyd - self.remaining_amount
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sub_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub temp_order_id: String,
    pub position: i32,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub purchase_price_usd_minor: i64,
    pub selling_price_lyd_minor: i64,
    pub down_payment_lyd_minor: i64,
    pub remaining_amount_minor: i64,
    pub status: String,
    pub representative_id: Option<String>,
    pub representative_name: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::temp_orders::Entity",
        from = "Column::TempOrderId",
        to = "super::temp_orders::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    TempOrders,
}

impl Related<super::temp_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TempOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<(&SubOrder, i32)> for ActiveModel {
    fn from((value, position): (&SubOrder, i32)) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            temp_order_id: ActiveValue::Set(value.temp_order_id.to_string()),
            position: ActiveValue::Set(position),
            customer_name: ActiveValue::Set(value.customer_name.clone()),
            customer_phone: ActiveValue::Set(value.customer_phone.clone()),
            customer_address: ActiveValue::Set(value.customer_address.clone()),
            purchase_price_usd_minor: ActiveValue::Set(value.purchase_price_usd.minor()),
            selling_price_lyd_minor: ActiveValue::Set(value.selling_price_lyd.minor()),
            down_payment_lyd_minor: ActiveValue::Set(value.down_payment_lyd.minor()),
            remaining_amount_minor: ActiveValue::Set(value.remaining_amount.minor()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            representative_id: ActiveValue::Set(value.representative_id.map(|id| id.to_string())),
            representative_name: ActiveValue::Set(value.representative_name.clone()),
        }
    }
}

impl TryFrom<Model> for SubOrder {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "sub order")?,
            temp_order_id: parse_uuid(&model.temp_order_id, "temp order")?,
            customer_name: model.customer_name,
            customer_phone: model.customer_phone,
            customer_address: model.customer_address,
            purchase_price_usd: Money::new(model.purchase_price_usd_minor),
            selling_price_lyd: Money::new(model.selling_price_lyd_minor),
            down_payment_lyd: Money::new(model.down_payment_lyd_minor),
            remaining_amount: Money::new(model.remaining_amount_minor),
            status: OrderStatus::try_from(model.status.as_str())?,
            representative_id: parse_optional_uuid(
                model.representative_id.as_deref(),
                "representative",
            )?,
            representative_name: model.representative_name,
        })
    }
}
