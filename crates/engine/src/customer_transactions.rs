//! Customer ledger.
//!
//! Payments against temporary batch orders are recorded here under a
//! synthetic customer id (`TEMP-<temp order id>`) so reports can tell them
//! apart from registered customers.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AccountType, EngineError, LedgerRecord, Money, util::parse_uuid};

const TEMP_CUSTOMER_PREFIX: &str = "TEMP-";

/// Customer id used for payments on a temporary order.
#[must_use]
pub fn temp_customer_id(temp_order_id: Uuid) -> String {
    format!("{TEMP_CUSTOMER_PREFIX}{temp_order_id}")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerTransaction {
    pub id: Uuid,
    pub customer_id: String,
    pub customer_name: String,
    pub amount: Money,
    pub account_type: AccountType,
    pub description: String,
    pub date: DateTime<Utc>,
}

impl CustomerTransaction {
    /// `true` when the transaction belongs to a temporary order customer.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.customer_id.starts_with(TEMP_CUSTOMER_PREFIX)
    }
}

impl LedgerRecord for CustomerTransaction {
    fn amount(&self) -> Money {
        self.amount
    }

    fn account_type(&self) -> AccountType {
        self.account_type
    }

    fn date(&self) -> DateTime<Utc> {
        self.date
    }

    fn counterparty_name(&self) -> &str {
        &self.customer_name
    }

    fn notes(&self) -> &str {
        &self.description
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "customer_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub amount_minor: i64,
    pub account_type: Option<String>,
    pub description: String,
    pub date: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CustomerTransaction> for ActiveModel {
    fn from(value: &CustomerTransaction) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            customer_id: ActiveValue::Set(value.customer_id.clone()),
            customer_name: ActiveValue::Set(value.customer_name.clone()),
            amount_minor: ActiveValue::Set(value.amount.minor()),
            account_type: ActiveValue::Set(Some(value.account_type.as_str().to_string())),
            description: ActiveValue::Set(value.description.clone()),
            date: ActiveValue::Set(value.date),
        }
    }
}

impl TryFrom<Model> for CustomerTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            customer_id: model.customer_id,
            customer_name: model.customer_name,
            amount: Money::new(model.amount_minor),
            account_type: AccountType::from_stored(model.account_type.as_deref()),
            description: model.description,
            date: model.date,
        })
    }
}
