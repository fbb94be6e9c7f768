use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
    sea_query::Expr,
};

use crate::{
    AccountType, Balances, Creditor, CreditorUpdate, DebtStatus, EngineError, ExternalDebt,
    LedgerFilter, LedgerReport, Money, NewCreditor, NewExternalDebt, ResultEngine, balances,
    creditors, external_debts,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

impl Engine {
    /// Return all creditors ordered by name.
    pub async fn creditors(&self) -> ResultEngine<Vec<Creditor>> {
        let models = creditors::Entity::find()
            .order_by_asc(creditors::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(Creditor::try_from).collect()
    }

    /// Return a creditor snapshot from DB.
    pub async fn creditor(&self, creditor_id: Uuid) -> ResultEngine<Creditor> {
        let model = self.require_creditor(&self.database, creditor_id).await?;
        Creditor::try_from(model)
    }

    /// Add a new creditor.
    ///
    /// A non-zero `initial_balance` is written as an opening `cash` entry in
    /// the same transaction, so the cached total always matches the ledger.
    pub async fn add_creditor(
        &self,
        cmd: NewCreditor,
        initial_balance: Money,
    ) -> ResultEngine<Creditor> {
        let name = normalize_required_name(&cmd.name, "creditor")?;
        initial_balance.ensure_within_limit()?;
        let created_at = Utc::now();
        with_tx!(self, |db_tx| {
            let exists = creditors::Entity::find()
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let mut creditor = Creditor {
                id: Uuid::new_v4(),
                name,
                kind: cmd.kind,
                phone: normalize_optional_text(cmd.phone.as_deref()),
                currency: cmd.currency,
                total_debt: Money::ZERO,
                created_at,
            };
            creditors::ActiveModel::from(&creditor)
                .insert(&db_tx)
                .await?;

            if !initial_balance.is_zero() {
                let opening = ExternalDebt {
                    id: Uuid::new_v4(),
                    creditor_id: creditor.id,
                    creditor_name: creditor.name.clone(),
                    amount: initial_balance,
                    account_type: AccountType::Cash,
                    date: created_at,
                    status: DebtStatus::Pending,
                    notes: "opening balance".to_string(),
                };
                self.write_external_debt(&db_tx, &opening).await?;
                creditor.total_debt = initial_balance;
            }

            Ok(creditor)
        })
    }

    /// Update name, kind, phone or currency. The cached total is left alone.
    pub async fn update_creditor(
        &self,
        creditor_id: Uuid,
        update: CreditorUpdate,
    ) -> ResultEngine<Creditor> {
        let new_name = update
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "creditor"))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let model = self.require_creditor(&db_tx, creditor_id).await?;
            let mut creditor = Creditor::try_from(model)?;

            if let Some(name) = new_name {
                let exists = creditors::Entity::find()
                    .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                    .filter(creditors::Column::Id.ne(creditor_id.to_string()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if exists {
                    return Err(EngineError::ExistingKey(name));
                }
                creditor.name = name;
            }
            if let Some(kind) = update.kind {
                creditor.kind = kind;
            }
            if let Some(phone) = update.phone.as_deref() {
                creditor.phone = normalize_optional_text(Some(phone));
            }
            if let Some(currency) = update.currency {
                creditor.currency = currency;
            }

            creditors::ActiveModel {
                id: ActiveValue::Set(creditor.id.to_string()),
                name: ActiveValue::Set(creditor.name.clone()),
                kind: ActiveValue::Set(creditor.kind.as_str().to_string()),
                phone: ActiveValue::Set(creditor.phone.clone()),
                currency: ActiveValue::Set(creditor.currency.code().to_string()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Ok(creditor)
        })
    }

    /// Delete a creditor together with its whole ledger.
    pub async fn delete_creditor(&self, creditor_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_creditor(&db_tx, creditor_id).await?;
            external_debts::Entity::delete_many()
                .filter(external_debts::Column::CreditorId.eq(creditor_id.to_string()))
                .exec(&db_tx)
                .await?;
            creditors::Entity::delete_by_id(creditor_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Append an entry to a creditor's ledger and adjust its cached total.
    pub async fn add_external_debt(&self, cmd: NewExternalDebt) -> ResultEngine<ExternalDebt> {
        if cmd.amount.is_zero() {
            return Err(EngineError::InvalidAmount(
                "debt amount must not be zero".to_string(),
            ));
        }
        cmd.amount.ensure_within_limit()?;
        with_tx!(self, |db_tx| {
            let creditor = self.require_creditor(&db_tx, cmd.creditor_id).await?;
            let entry = ExternalDebt {
                id: Uuid::new_v4(),
                creditor_id: cmd.creditor_id,
                creditor_name: creditor.name,
                amount: cmd.amount,
                account_type: cmd.account_type,
                date: cmd.date,
                status: DebtStatus::Pending,
                notes: normalize_optional_text(cmd.notes.as_deref()).unwrap_or_default(),
            };
            self.write_external_debt(&db_tx, &entry).await?;
            Ok(entry)
        })
    }

    /// Delete a ledger entry and take its amount back out of the cached total.
    pub async fn delete_external_debt(&self, debt_id: Uuid) -> ResultEngine<ExternalDebt> {
        with_tx!(self, |db_tx| {
            let model = external_debts::Entity::find_by_id(debt_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("debt not exists".to_string()))?;
            let entry = ExternalDebt::try_from(model)?;

            external_debts::Entity::delete_by_id(debt_id.to_string())
                .exec(&db_tx)
                .await?;
            self.adjust_total_debt(&db_tx, entry.creditor_id, entry.amount.try_neg()?)
                .await?;
            Ok(entry)
        })
    }

    /// Return every ledger entry, newest first.
    pub async fn all_external_debts(&self) -> ResultEngine<Vec<ExternalDebt>> {
        let models = external_debts::Entity::find()
            .order_by_desc(external_debts::Column::Date)
            .all(&self.database)
            .await?;
        models.into_iter().map(ExternalDebt::try_from).collect()
    }

    /// Return one creditor's ledger, newest first.
    pub async fn external_debts_for(&self, creditor_id: Uuid) -> ResultEngine<Vec<ExternalDebt>> {
        self.require_creditor(&self.database, creditor_id).await?;
        let models = external_debts::Entity::find()
            .filter(external_debts::Column::CreditorId.eq(creditor_id.to_string()))
            .order_by_desc(external_debts::Column::Date)
            .all(&self.database)
            .await?;
        models.into_iter().map(ExternalDebt::try_from).collect()
    }

    /// Per-account balances of one creditor, computed from the live entries.
    pub async fn creditor_balance(&self, creditor_id: Uuid) -> ResultEngine<Balances> {
        let entries = self.external_debts_for(creditor_id).await?;
        balances::aggregate(&entries)
    }

    /// Re-derive the cached total from the ledger and persist it.
    pub async fn recompute_creditor_total(&self, creditor_id: Uuid) -> ResultEngine<Money> {
        with_tx!(self, |db_tx| {
            self.require_creditor(&db_tx, creditor_id).await?;
            let entries = external_debts::Entity::find()
                .filter(external_debts::Column::CreditorId.eq(creditor_id.to_string()))
                .all(&db_tx)
                .await?;
            let total = Money::try_sum(
                entries
                    .into_iter()
                    .map(|model| Money::new(model.amount_minor)),
            )?;

            creditors::ActiveModel {
                id: ActiveValue::Set(creditor_id.to_string()),
                total_debt_minor: ActiveValue::Set(total.minor()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(total)
        })
    }

    /// Filtered view over all creditor entries with per-account totals.
    pub async fn creditor_report(
        &self,
        filter: &LedgerFilter,
    ) -> ResultEngine<LedgerReport<ExternalDebt>> {
        let entries = self.all_external_debts().await?;
        balances::report(entries, filter)
    }

    async fn require_creditor<C: ConnectionTrait>(
        &self,
        db: &C,
        creditor_id: Uuid,
    ) -> ResultEngine<creditors::Model> {
        creditors::Entity::find_by_id(creditor_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("creditor not exists".to_string()))
    }

    async fn write_external_debt(
        &self,
        db_tx: &DatabaseTransaction,
        entry: &ExternalDebt,
    ) -> ResultEngine<()> {
        external_debts::ActiveModel::from(entry)
            .insert(db_tx)
            .await?;
        self.adjust_total_debt(db_tx, entry.creditor_id, entry.amount)
            .await
    }

    /// `total_debt = total_debt + delta`, evaluated by the database.
    ///
    /// The update only matches while the new total stays within
    /// `[-Money::MAX, Money::MAX]`; otherwise nothing is written and
    /// `InvalidAmount` is returned.
    async fn adjust_total_debt(
        &self,
        db_tx: &DatabaseTransaction,
        creditor_id: Uuid,
        delta: Money,
    ) -> ResultEngine<()> {
        let delta = delta.ensure_within_limit()?.minor();
        let limit = Money::MAX.minor();
        let in_range = if delta >= 0 {
            creditors::Column::TotalDebtMinor.lte(limit - delta)
        } else {
            creditors::Column::TotalDebtMinor.gte(-limit - delta)
        };
        let result = creditors::Entity::update_many()
            .col_expr(
                creditors::Column::TotalDebtMinor,
                Expr::col(creditors::Column::TotalDebtMinor).add(delta),
            )
            .filter(creditors::Column::Id.eq(creditor_id.to_string()))
            .filter(in_range)
            .exec(db_tx)
            .await?;
        if result.rows_affected != 1 {
            let creditor = self.require_creditor(db_tx, creditor_id).await?;
            return Err(EngineError::InvalidAmount(format!(
                "total debt {} of '{}' cannot move by {} without leaving the supported range",
                Money::new(creditor.total_debt_minor),
                creditor.name,
                Money::new(delta)
            )));
        }
        Ok(())
    }
}
