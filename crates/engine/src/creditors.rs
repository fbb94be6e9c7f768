//! The module contains `Creditor`, a company or person the business owes
//! money to (or is owed by), and its storage model.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, Money, util::parse_uuid};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditorKind {
    #[default]
    Company,
    Person,
}

impl CreditorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Person => "person",
        }
    }
}

impl TryFrom<&str> for CreditorKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "company" => Ok(Self::Company),
            "person" => Ok(Self::Person),
            other => Err(EngineError::InvalidInput(format!(
                "invalid creditor kind: {other}"
            ))),
        }
    }
}

/// A creditor.
///
/// `total_debt` is a cached running total of the creditor's live ledger
/// entries. It is only ever adjusted inside the DB transaction that writes
/// or deletes an entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creditor {
    pub id: Uuid,
    pub name: String,
    pub kind: CreditorKind,
    pub phone: Option<String>,
    pub currency: Currency,
    pub total_debt: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "creditors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub kind: String,
    pub phone: Option<String>,
    pub currency: String,
    pub total_debt_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::external_debts::Entity")]
    ExternalDebts,
}

impl Related<super::external_debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExternalDebts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Creditor> for ActiveModel {
    fn from(value: &Creditor) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            phone: ActiveValue::Set(value.phone.clone()),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            total_debt_minor: ActiveValue::Set(value.total_debt.minor()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Creditor {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "creditor")?,
            name: model.name,
            kind: CreditorKind::try_from(model.kind.as_str())?,
            phone: model.phone,
            currency: Currency::try_from(model.currency.as_str())?,
            total_debt: Money::new(model.total_debt_minor),
            created_at: model.created_at,
        })
    }
}
