use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Deposit, DepositStatus, DepositUpdate, EngineError, NewDeposit, ResultEngine, deposits,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, representative_name, with_tx};

impl Engine {
    /// Return all deposits, newest first.
    pub async fn deposits(&self) -> ResultEngine<Vec<Deposit>> {
        let models = deposits::Entity::find()
            .order_by_desc(deposits::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(Deposit::try_from).collect()
    }

    /// Return a deposit snapshot from DB.
    pub async fn deposit(&self, deposit_id: Uuid) -> ResultEngine<Deposit> {
        load_deposit(&self.database, deposit_id).await
    }

    /// Register a new pending deposit.
    pub async fn add_deposit(&self, cmd: NewDeposit) -> ResultEngine<Deposit> {
        let customer_name = normalize_required_name(&cmd.customer_name, "customer")?;
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "deposit amount must be > 0".to_string(),
            ));
        }
        cmd.amount.ensure_within_limit()?;
        let created_at = Utc::now();
        with_tx!(self, |db_tx| {
            let deposit = Deposit {
                id: Uuid::new_v4(),
                customer_name,
                customer_phone: normalize_optional_text(cmd.customer_phone.as_deref()),
                amount: cmd.amount,
                description: normalize_optional_text(cmd.description.as_deref())
                    .unwrap_or_default(),
                status: DepositStatus::Pending,
                representative_id: cmd.representative_id,
                representative_name: representative_name(&db_tx, cmd.representative_id).await?,
                created_at,
                collected_date: None,
            };
            deposits::ActiveModel::from(&deposit).insert(&db_tx).await?;
            Ok(deposit)
        })
    }

    /// Edit a deposit that is still pending. The status is never touched.
    pub async fn update_deposit(
        &self,
        deposit_id: Uuid,
        update: DepositUpdate,
    ) -> ResultEngine<Deposit> {
        let customer_name = update
            .customer_name
            .as_deref()
            .map(|name| normalize_required_name(name, "customer"))
            .transpose()?;
        if let Some(amount) = update.amount
            && !amount.is_positive()
        {
            return Err(EngineError::InvalidAmount(
                "deposit amount must be > 0".to_string(),
            ));
        }
        if let Some(amount) = update.amount {
            amount.ensure_within_limit()?;
        }

        with_tx!(self, |db_tx| {
            let mut deposit = load_deposit(&db_tx, deposit_id).await?;
            if deposit.status != DepositStatus::Pending {
                return Err(EngineError::InvalidInput(format!(
                    "deposit is already {}",
                    deposit.status.as_str()
                )));
            }

            if let Some(name) = customer_name {
                deposit.customer_name = name;
            }
            if let Some(phone) = update.customer_phone.as_deref() {
                deposit.customer_phone = normalize_optional_text(Some(phone));
            }
            if let Some(amount) = update.amount {
                deposit.amount = amount;
            }
            if let Some(description) = update.description.as_deref() {
                deposit.description = normalize_optional_text(Some(description)).unwrap_or_default();
            }
            if let Some(representative_id) = update.representative_id {
                deposit.representative_name =
                    representative_name(&db_tx, representative_id).await?;
                deposit.representative_id = representative_id;
            }

            let mut model = deposits::ActiveModel::from(&deposit);
            model.id = ActiveValue::NotSet;
            model.status = ActiveValue::NotSet;
            model.collected_date = ActiveValue::NotSet;
            model.created_at = ActiveValue::NotSet;
            let result = deposits::Entity::update_many()
                .set(model)
                .filter(deposits::Column::Id.eq(deposit_id.to_string()))
                .filter(deposits::Column::Status.eq(DepositStatus::Pending.as_str()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected != 1 {
                return Err(EngineError::Conflict(
                    "deposit status changed, update not applied".to_string(),
                ));
            }

            Ok(deposit)
        })
    }

    /// Admin status change: `pending` to `collected` or `cancelled`.
    pub async fn update_deposit_status(
        &self,
        deposit_id: Uuid,
        status: DepositStatus,
    ) -> ResultEngine<Deposit> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let mut deposit = load_deposit(&db_tx, deposit_id).await?;
            let from = deposit.status;
            deposit.transition(status, now)?;
            save_status(&db_tx, &deposit, from).await?;
            Ok(deposit)
        })
    }

    /// A representative confirms they collected the deposit.
    ///
    /// Deposits assigned to someone else are rejected; an unassigned
    /// deposit is taken over by the confirming representative.
    pub async fn confirm_deposit_collection(
        &self,
        deposit_id: Uuid,
        representative_id: Uuid,
    ) -> ResultEngine<Deposit> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let name = representative_name(&db_tx, Some(representative_id)).await?;
            let mut deposit = load_deposit(&db_tx, deposit_id).await?;
            let from = deposit.status;
            match deposit.representative_id {
                Some(assigned) if assigned != representative_id => {
                    return Err(EngineError::InvalidInput(
                        "deposit is assigned to another representative".to_string(),
                    ));
                }
                Some(_) => {}
                None => {
                    deposit.representative_id = Some(representative_id);
                    deposit.representative_name = name;
                }
            }
            deposit.transition(DepositStatus::Collected, now)?;
            save_status(&db_tx, &deposit, from).await?;
            Ok(deposit)
        })
    }

    /// Delete a deposit in any state.
    pub async fn delete_deposit(&self, deposit_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let result = deposits::Entity::delete_by_id(deposit_id.to_string())
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::KeyNotFound("deposit not exists".to_string()));
            }
            Ok(())
        })
    }

    /// Deposits assigned to a representative, newest first.
    pub async fn deposits_by_representative(
        &self,
        representative_id: Uuid,
    ) -> ResultEngine<Vec<Deposit>> {
        representative_name(&self.database, Some(representative_id)).await?;
        let models = deposits::Entity::find()
            .filter(deposits::Column::RepresentativeId.eq(representative_id.to_string()))
            .order_by_desc(deposits::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(Deposit::try_from).collect()
    }
}

async fn load_deposit<C: ConnectionTrait>(db: &C, deposit_id: Uuid) -> ResultEngine<Deposit> {
    let model = deposits::Entity::find_by_id(deposit_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("deposit not exists".to_string()))?;
    Deposit::try_from(model)
}

/// Writes the new status only if the row is still in `from`.
async fn save_status<C: ConnectionTrait>(
    db: &C,
    deposit: &Deposit,
    from: DepositStatus,
) -> ResultEngine<()> {
    let result = deposits::Entity::update_many()
        .set(deposits::ActiveModel {
            status: ActiveValue::Set(deposit.status.as_str().to_string()),
            collected_date: ActiveValue::Set(deposit.collected_date),
            representative_id: ActiveValue::Set(
                deposit.representative_id.map(|id| id.to_string()),
            ),
            representative_name: ActiveValue::Set(deposit.representative_name.clone()),
            ..Default::default()
        })
        .filter(deposits::Column::Id.eq(deposit.id.to_string()))
        .filter(deposits::Column::Status.eq(from.as_str()))
        .exec(db)
        .await?;
    if result.rows_affected != 1 {
        return Err(EngineError::Conflict(
            "deposit status changed, update not applied".to_string(),
        ));
    }
    Ok(())
}
