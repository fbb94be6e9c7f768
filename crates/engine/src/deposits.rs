//! Prepaid / earnest-money deposits.
//!
//! A deposit starts `pending`. When a representative is assigned they confirm
//! the collection; without one the admin is the implicit collector.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    DepositStatus, EngineError, Money, ResultEngine,
    util::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub amount: Money,
    pub description: String,
    pub status: DepositStatus,
    pub representative_id: Option<Uuid>,
    pub representative_name: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Set exactly when the deposit moves to `collected`.
    pub collected_date: Option<DateTime<Utc>>,
}

impl Deposit {
    /// Moves the deposit to `next`, stamping `collected_date` on collection.
    pub fn transition(&mut self, next: DepositStatus, at: DateTime<Utc>) -> ResultEngine<()> {
        self.status = self.status.transition(next)?;
        if next == DepositStatus::Collected {
            self.collected_date = Some(at);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "deposits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub amount_minor: i64,
    pub description: String,
    pub status: String,
    pub representative_id: Option<String>,
    pub representative_name: Option<String>,
    pub created_at: DateTimeUtc,
    pub collected_date: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Deposit> for ActiveModel {
    fn from(value: &Deposit) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            customer_name: ActiveValue::Set(value.customer_name.clone()),
            customer_phone: ActiveValue::Set(value.customer_phone.clone()),
            amount_minor: ActiveValue::Set(value.amount.minor()),
            description: ActiveValue::Set(value.description.clone()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            representative_id: ActiveValue::Set(value.representative_id.map(|id| id.to_string())),
            representative_name: ActiveValue::Set(value.representative_name.clone()),
            created_at: ActiveValue::Set(value.created_at),
            collected_date: ActiveValue::Set(value.collected_date),
        }
    }
}

impl TryFrom<Model> for Deposit {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "deposit")?,
            customer_name: model.customer_name,
            customer_phone: model.customer_phone,
            amount: Money::new(model.amount_minor),
            description: model.description,
            status: DepositStatus::try_from(model.status.as_str())?,
            representative_id: parse_optional_uuid(
                model.representative_id.as_deref(),
                "representative",
            )?,
            representative_name: model.representative_name,
            created_at: model.created_at,
            collected_date: model.collected_date,
        })
    }
}
