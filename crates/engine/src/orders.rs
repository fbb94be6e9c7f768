//! Regular (non-temporary) orders.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Money, OrderStatus,
    util::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub tracking_number: Option<String>,
    pub selling_price_lyd: Money,
    pub remaining_amount: Money,
    /// Cash a representative confirmed on delivery.
    pub collected_amount: Option<Money>,
    pub status: OrderStatus,
    pub representative_id: Option<Uuid>,
    pub representative_name: Option<String>,
    pub delivery_date: Option<DateTime<Utc>>,
    /// Temporary batch this order was converted from.
    pub temp_order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub tracking_number: Option<String>,
    pub selling_price_lyd_minor: i64,
    pub remaining_amount_minor: i64,
    pub collected_amount_minor: Option<i64>,
    pub status: String,
    pub representative_id: Option<String>,
    pub representative_name: Option<String>,
    pub delivery_date: Option<DateTimeUtc>,
    pub temp_order_id: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Order> for ActiveModel {
    fn from(value: &Order) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            customer_id: ActiveValue::Set(value.customer_id.clone()),
            customer_name: ActiveValue::Set(value.customer_name.clone()),
            tracking_number: ActiveValue::Set(value.tracking_number.clone()),
            selling_price_lyd_minor: ActiveValue::Set(value.selling_price_lyd.minor()),
            remaining_amount_minor: ActiveValue::Set(value.remaining_amount.minor()),
            collected_amount_minor: ActiveValue::Set(value.collected_amount.map(Money::minor)),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            representative_id: ActiveValue::Set(value.representative_id.map(|id| id.to_string())),
            representative_name: ActiveValue::Set(value.representative_name.clone()),
            delivery_date: ActiveValue::Set(value.delivery_date),
            temp_order_id: ActiveValue::Set(value.temp_order_id.map(|id| id.to_string())),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Order {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "order")?,
            customer_id: model.customer_id,
            customer_name: model.customer_name,
            tracking_number: model.tracking_number,
            selling_price_lyd: Money::new(model.selling_price_lyd_minor),
            remaining_amount: Money::new(model.remaining_amount_minor),
            collected_amount: model.collected_amount_minor.map(Money::new),
            status: OrderStatus::try_from(model.status.as_str())?,
            representative_id: parse_optional_uuid(
                model.representative_id.as_deref(),
                "representative",
            )?,
            representative_name: model.representative_name,
            delivery_date: model.delivery_date,
            temp_order_id: parse_optional_uuid(model.temp_order_id.as_deref(), "temp order")?,
            created_at: model.created_at,
        })
    }
}
