use sea_orm::{QueryFilter, QueryOrder, prelude::*};

use crate::{
    CustomerTransaction, LedgerFilter, LedgerReport, ResultEngine, balances, customer_transactions,
};

use super::Engine;

impl Engine {
    /// Return the customer ledger, newest first.
    pub async fn transactions(&self) -> ResultEngine<Vec<CustomerTransaction>> {
        let models = customer_transactions::Entity::find()
            .order_by_desc(customer_transactions::Column::Date)
            .all(&self.database)
            .await?;
        models
            .into_iter()
            .map(CustomerTransaction::try_from)
            .collect()
    }

    /// Return the ledger of one customer (a registered id or a `TEMP-` id).
    pub async fn transactions_for_customer(
        &self,
        customer_id: &str,
    ) -> ResultEngine<Vec<CustomerTransaction>> {
        let models = customer_transactions::Entity::find()
            .filter(customer_transactions::Column::CustomerId.eq(customer_id))
            .order_by_desc(customer_transactions::Column::Date)
            .all(&self.database)
            .await?;
        models
            .into_iter()
            .map(CustomerTransaction::try_from)
            .collect()
    }

    /// Filtered view over the customer ledger with per-account totals.
    pub async fn transactions_report(
        &self,
        filter: &LedgerFilter,
    ) -> ResultEngine<LedgerReport<CustomerTransaction>> {
        let transactions = self.transactions().await?;
        balances::report(transactions, filter)
    }
}
