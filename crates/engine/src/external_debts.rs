//! Creditor ledger entries.
//!
//! An [`ExternalDebt`] is immutable once written: it can be deleted but never
//! edited in place. Positive amounts mean the creditor is owed more, negative
//! amounts mean a payment against the balance.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AccountType, EngineError, LedgerRecord, Money, util::parse_uuid};

/// Stored with every entry but not read by any aggregation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    #[default]
    Pending,
}

impl DebtStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
        }
    }
}

impl TryFrom<&str> for DebtStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            other => Err(EngineError::InvalidInput(format!(
                "invalid debt status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDebt {
    pub id: Uuid,
    pub creditor_id: Uuid,
    /// Creditor name at the time the entry was written.
    pub creditor_name: String,
    pub amount: Money,
    pub account_type: AccountType,
    pub date: DateTime<Utc>,
    pub status: DebtStatus,
    pub notes: String,
}

impl LedgerRecord for ExternalDebt {
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
        &self.creditor_name
    }

    fn notes(&self) -> &str {
        &self.notes
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "external_debts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub creditor_id: String,
    pub creditor_name: String,
    pub amount_minor: i64,
    pub account_type: Option<String>,
    pub date: DateTimeUtc,
    pub status: String,
    pub notes: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::creditors::Entity",
        from = "Column::CreditorId",
        to = "super::creditors::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Creditors,
}

impl Related<super::creditors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creditors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ExternalDebt> for ActiveModel {
    fn from(value: &ExternalDebt) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            creditor_id: ActiveValue::Set(value.creditor_id.to_string()),
            creditor_name: ActiveValue::Set(value.creditor_name.clone()),
            amount_minor: ActiveValue::Set(value.amount.minor()),
            account_type: ActiveValue::Set(Some(value.account_type.as_str().to_string())),
            date: ActiveValue::Set(value.date),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            notes: ActiveValue::Set(value.notes.clone()),
        }
    }
}

impl TryFrom<Model> for ExternalDebt {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "external debt")?,
            creditor_id: parse_uuid(&model.creditor_id, "creditor")?,
            creditor_name: model.creditor_name,
            amount: Money::new(model.amount_minor),
            account_type: AccountType::from_stored(model.account_type.as_deref()),
            date: model.date,
            status: DebtStatus::try_from(model.status.as_str()).unwrap_or_default(),
            notes: model.notes,
        })
    }
}
