use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{
    DepositStatus, EngineError, FinancialLog, LogFilter, Money, NewRepresentative, OrderStatus,
    Representative, RepresentativeSummary, ResultEngine,
    financial_log::{filter_log, merge_log},
    representatives,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

impl Engine {
    /// Return all representatives ordered by name.
    pub async fn representatives(&self) -> ResultEngine<Vec<Representative>> {
        let models = representatives::Entity::find()
            .order_by_asc(representatives::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(Representative::try_from).collect()
    }

    /// Return a representative snapshot from DB.
    pub async fn representative(&self, representative_id: Uuid) -> ResultEngine<Representative> {
        let model = representatives::Entity::find_by_id(representative_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("representative not exists".to_string()))?;
        Representative::try_from(model)
    }

    /// Register a representative. Names are unique, ignoring case.
    pub async fn add_representative(&self, cmd: NewRepresentative) -> ResultEngine<Representative> {
        let name = normalize_required_name(&cmd.name, "representative")?;
        let created_at = Utc::now();
        with_tx!(self, |db_tx| {
            let exists = representatives::Entity::find()
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let representative = Representative {
                id: Uuid::new_v4(),
                name,
                phone: normalize_optional_text(cmd.phone.as_deref()),
                created_at,
            };
            representatives::ActiveModel::from(&representative)
                .insert(&db_tx)
                .await?;
            Ok(representative)
        })
    }

    /// Everything a representative collected, filtered and summarised.
    ///
    /// `today` anchors the relative periods (daily, weekly, ...).
    pub async fn representative_financial_log(
        &self,
        representative_id: Uuid,
        filter: &LogFilter,
        today: NaiveDate,
    ) -> ResultEngine<FinancialLog> {
        let orders = self.orders_by_representative(representative_id).await?;
        let deposits = self.deposits_by_representative(representative_id).await?;
        filter_log(merge_log(&orders, &deposits), filter, today)
    }

    /// Open balances versus collected cash for one representative.
    pub async fn representative_summary(
        &self,
        representative_id: Uuid,
    ) -> ResultEngine<RepresentativeSummary> {
        let orders = self.orders_by_representative(representative_id).await?;
        let sub_orders = self
            .temp_sub_orders_by_representative(representative_id)
            .await?;
        let deposits = self.deposits_by_representative(representative_id).await?;

        let pending_orders_amount = Money::try_sum(
            orders
                .iter()
                .filter(|o| !o.status.is_terminal())
                .map(|o| o.remaining_amount),
        )?;
        let pending_sub_orders_amount = Money::try_sum(
            sub_orders
                .iter()
                .filter(|s| !s.is_paid() && s.status != OrderStatus::Cancelled)
                .map(|s| s.remaining_amount),
        )?;
        let pending_deposits_amount = Money::try_sum(
            deposits
                .iter()
                .filter(|d| d.status == DepositStatus::Pending)
                .map(|d| d.amount),
        )?;
        let total_collected =
            Money::try_sum(merge_log(&orders, &deposits).iter().map(|entry| entry.amount))?;

        Ok(RepresentativeSummary {
            pending_orders_amount,
            pending_sub_orders_amount,
            pending_deposits_amount,
            total_collected,
        })
    }
}
