//! Representative financial log.
//!
//! Merges the two kinds of cash a representative brings back (delivered
//! orders and collected deposits) into one chronological log. Filters are
//! applied before the summary is computed, so the summary always describes
//! exactly the rows returned.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Deposit, DepositStatus, Money, Order, OrderStatus, Period, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEntryKind {
    Order,
    Deposit,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialLogEntry {
    pub kind: LogEntryKind,
    pub source_id: Uuid,
    pub amount: Money,
    pub date: DateTime<Utc>,
    pub customer_name: String,
    pub description: String,
}

impl FinancialLogEntry {
    /// A delivered order with a confirmed collection, if `order` is one.
    #[must_use]
    pub fn from_order(order: &Order) -> Option<Self> {
        if order.status != OrderStatus::Delivered {
            return None;
        }
        let (Some(amount), Some(date)) = (order.collected_amount, order.delivery_date) else {
            return None;
        };
        let description = match &order.tracking_number {
            Some(tracking) => format!("order {tracking}"),
            None => "order delivery".to_string(),
        };
        Some(Self {
            kind: LogEntryKind::Order,
            source_id: order.id,
            amount,
            date,
            customer_name: order.customer_name.clone(),
            description,
        })
    }

    /// A collected deposit, if `deposit` is one.
    #[must_use]
    pub fn from_deposit(deposit: &Deposit) -> Option<Self> {
        if deposit.status != DepositStatus::Collected {
            return None;
        }
        let date = deposit.collected_date?;
        let description = if deposit.description.is_empty() {
            "deposit".to_string()
        } else {
            deposit.description.clone()
        };
        Some(Self {
            kind: LogEntryKind::Deposit,
            source_id: deposit.id,
            amount: deposit.amount,
            date,
            customer_name: deposit.customer_name.clone(),
            description,
        })
    }
}

/// Builds the merged log, newest first. Ties are ordered by source id so
/// the output does not depend on input order.
pub fn merge_log<'a>(
    orders: impl IntoIterator<Item = &'a Order>,
    deposits: impl IntoIterator<Item = &'a Deposit>,
) -> Vec<FinancialLogEntry> {
    let mut entries: Vec<FinancialLogEntry> = orders
        .into_iter()
        .filter_map(FinancialLogEntry::from_order)
        .chain(deposits.into_iter().filter_map(FinancialLogEntry::from_deposit))
        .collect();
    entries.sort_by(|a, b| b.date.cmp(&a.date).then(a.source_id.cmp(&b.source_id)));
    entries
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    pub period: Period,
    /// Case-insensitive substring of the description or customer name.
    pub text: Option<String>,
}

impl LogFilter {
    fn matches(&self, entry: &FinancialLogEntry, today: NaiveDate) -> bool {
        if let Some(range) = self.period.resolve(today)
            && !range.contains(entry.date)
        {
            return false;
        }
        let needle = self
            .text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        match needle {
            Some(needle) => {
                entry.description.to_lowercase().contains(&needle)
                    || entry.customer_name.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSummary {
    pub total_collected: Money,
    pub order_count: usize,
    pub deposit_count: usize,
    pub order_total: Money,
    pub deposit_total: Money,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialLog {
    pub rows: Vec<FinancialLogEntry>,
    pub summary: LogSummary,
}

/// Filters an already merged log and summarises the surviving rows.
pub fn filter_log(
    entries: Vec<FinancialLogEntry>,
    filter: &LogFilter,
    today: NaiveDate,
) -> ResultEngine<FinancialLog> {
    let rows: Vec<FinancialLogEntry> = entries
        .into_iter()
        .filter(|e| filter.matches(e, today))
        .collect();

    let mut summary = LogSummary::default();
    for row in &rows {
        summary.total_collected = summary.total_collected.try_add(row.amount)?;
        match row.kind {
            LogEntryKind::Order => {
                summary.order_count += 1;
                summary.order_total = summary.order_total.try_add(row.amount)?;
            }
            LogEntryKind::Deposit => {
                summary.deposit_count += 1;
                summary.deposit_total = summary.deposit_total.try_add(row.amount)?;
            }
        }
    }

    Ok(FinancialLog { rows, summary })
}
