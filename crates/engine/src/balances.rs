//! Balance aggregation over ledger records.
//!
//! Everything here is a pure function of its input: the same set of records
//! always yields the same balances, whatever order they come in. The engine
//! persists a cached `total_debt` per creditor, but these functions are the
//! source of truth the cache is checked against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountType, DateRange, Money, ResultEngine};

/// A signed financial event that can be aggregated.
pub trait LedgerRecord {
    fn amount(&self) -> Money;
    fn account_type(&self) -> AccountType;
    fn date(&self) -> DateTime<Utc>;
    fn counterparty_name(&self) -> &str;
    fn notes(&self) -> &str;
}

/// Per-bucket signed sums.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    pub cash: Money,
    pub bank: Money,
    pub usd: Money,
    /// Sum over every record, regardless of bucket.
    pub total: Money,
}

impl Balances {
    #[must_use]
    pub fn bucket(&self, account_type: AccountType) -> Money {
        match account_type {
            AccountType::Cash => self.cash,
            AccountType::Bank => self.bank,
            AccountType::Usd => self.usd,
        }
    }

    fn add(&mut self, account_type: AccountType, amount: Money) -> ResultEngine<()> {
        let bucket = match account_type {
            AccountType::Cash => &mut self.cash,
            AccountType::Bank => &mut self.bank,
            AccountType::Usd => &mut self.usd,
        };
        *bucket = bucket.try_add(amount)?;
        self.total = self.total.try_add(amount)?;
        Ok(())
    }
}

/// Sums `records` into bucket balances.
///
/// Fails with `InvalidAmount` when a sum leaves the supported money range.
pub fn aggregate<'a, R, I>(records: I) -> ResultEngine<Balances>
where
    R: LedgerRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut balances = Balances::default();
    for record in records {
        balances.add(record.account_type(), record.amount())?;
    }
    Ok(balances)
}

/// Filters for ledger reports. Every populated field must match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerFilter {
    pub range: Option<DateRange>,
    pub account_type: Option<AccountType>,
    /// Case-insensitive substring of the counterparty name or the notes.
    pub text: Option<String>,
}

impl LedgerFilter {
    pub fn matches<R: LedgerRecord>(&self, record: &R) -> bool {
        if let Some(range) = &self.range
            && !range.contains(record.date())
        {
            return false;
        }
        if let Some(account_type) = self.account_type
            && record.account_type() != account_type
        {
            return false;
        }
        match self.needle() {
            Some(needle) => {
                record.counterparty_name().to_lowercase().contains(&needle)
                    || record.notes().to_lowercase().contains(&needle)
            }
            None => true,
        }
    }

    fn needle(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// Gross figures for one bucket.
///
/// `credits` is the absolute value of the non-positive amounts, so
/// `net == debits - credits` is the bucket's signed sum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketReport {
    pub debits: Money,
    pub credits: Money,
    pub net: Money,
}

impl BucketReport {
    fn add(&mut self, amount: Money) -> ResultEngine<()> {
        if amount.is_debit() {
            self.debits = self.debits.try_add(amount)?;
        } else {
            self.credits = self.credits.try_add(amount.try_neg()?)?;
        }
        self.net = self.net.try_add(amount)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerReport<R> {
    /// The filtered records, newest first.
    pub rows: Vec<R>,
    pub cash: BucketReport,
    pub bank: BucketReport,
    pub usd: BucketReport,
    pub total: BucketReport,
}

impl<R> LedgerReport<R> {
    #[must_use]
    pub fn bucket(&self, account_type: AccountType) -> &BucketReport {
        match account_type {
            AccountType::Cash => &self.cash,
            AccountType::Bank => &self.bank,
            AccountType::Usd => &self.usd,
        }
    }
}

/// Filters `records` and aggregates exactly the rows that survive, so the
/// totals always describe the returned rows.
pub fn report<R, I>(records: I, filter: &LedgerFilter) -> ResultEngine<LedgerReport<R>>
where
    R: LedgerRecord,
    I: IntoIterator<Item = R>,
{
    let mut rows: Vec<R> = records.into_iter().filter(|r| filter.matches(r)).collect();
    rows.sort_by(|a, b| b.date().cmp(&a.date()));

    let mut out = LedgerReport {
        rows: Vec::new(),
        cash: BucketReport::default(),
        bank: BucketReport::default(),
        usd: BucketReport::default(),
        total: BucketReport::default(),
    };
    for row in &rows {
        let amount = row.amount();
        match row.account_type() {
            AccountType::Cash => out.cash.add(amount)?,
            AccountType::Bank => out.bank.add(amount)?,
            AccountType::Usd => out.usd.add(amount)?,
        }
        out.total.add(amount)?;
    }
    out.rows = rows;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        amount: i64,
        account_type: AccountType,
        day: u32,
        name: &'static str,
        notes: &'static str,
    }

    impl LedgerRecord for Row {
        fn amount(&self) -> Money {
            Money::new(self.amount)
        }
        fn account_type(&self) -> AccountType {
            self.account_type
        }
        fn date(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 5, self.day, 12, 0, 0).unwrap()
        }
        fn counterparty_name(&self) -> &str {
            self.name
        }
        fn notes(&self) -> &str {
            self.notes
        }
    }

    fn row(amount: i64, account_type: AccountType, day: u32) -> Row {
        Row {
            amount,
            account_type,
            day,
            name: "Acme",
            notes: "",
        }
    }

    fn sample() -> Vec<Row> {
        vec![
            row(10_000, AccountType::Cash, 1),
            row(-4_000, AccountType::Cash, 2),
            row(2_500, AccountType::Bank, 3),
            row(-500, AccountType::Usd, 4),
            Row {
                name: "Global Shipping",
                notes: "container fee",
                ..row(1_200, AccountType::Bank, 5)
            },
        ]
    }

    #[test]
    fn aggregate_splits_buckets() {
        let balances = aggregate(&sample()).unwrap();
        assert_eq!(balances.cash, Money::new(6_000));
        assert_eq!(balances.bank, Money::new(3_700));
        assert_eq!(balances.usd, Money::new(-500));
        assert_eq!(balances.total, Money::new(9_200));
    }

    #[test]
    fn aggregate_ignores_order_and_is_repeatable() {
        let rows = sample();
        let mut reversed = rows.clone();
        reversed.reverse();
        assert_eq!(aggregate(&rows).unwrap(), aggregate(&reversed).unwrap());
        assert_eq!(aggregate(&rows).unwrap(), aggregate(&rows).unwrap());
    }

    #[test]
    fn empty_input_is_zero() {
        let rows: Vec<Row> = Vec::new();
        assert_eq!(aggregate(&rows).unwrap(), Balances::default());
    }

    #[test]
    fn report_totals_match_rows_for_every_filter() {
        let ranges = [
            None,
            Some(DateRange::day(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())),
            Some(DateRange {
                from: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
                to: NaiveDate::from_ymd_opt(2024, 5, 4).unwrap(),
            }),
        ];
        let buckets = [
            None,
            Some(AccountType::Cash),
            Some(AccountType::Bank),
            Some(AccountType::Usd),
        ];
        let texts = [None, Some("global".to_string()), Some("  ".to_string())];

        for range in ranges {
            for account_type in buckets {
                for text in &texts {
                    let filter = LedgerFilter {
                        range,
                        account_type,
                        text: text.clone(),
                    };
                    let report = report(sample(), &filter).unwrap();
                    let shown: Money = report.rows.iter().map(LedgerRecord::amount).sum();
                    assert_eq!(report.total.net, shown);
                    assert_eq!(report.total.debits - report.total.credits, shown);
                    for bucket in AccountType::ALL {
                        let bucket_sum: Money = report
                            .rows
                            .iter()
                            .filter(|r| r.account_type == bucket)
                            .map(LedgerRecord::amount)
                            .sum();
                        let figures = report.bucket(bucket);
                        assert_eq!(figures.net, bucket_sum);
                        assert_eq!(figures.debits - figures.credits, figures.net);
                    }
                }
            }
        }
    }

    #[test]
    fn report_splits_debits_and_credits() {
        let report = report(sample(), &LedgerFilter::default()).unwrap();
        assert_eq!(report.cash.debits, Money::new(10_000));
        assert_eq!(report.cash.credits, Money::new(4_000));
        assert_eq!(report.cash.net, Money::new(6_000));
        assert_eq!(report.usd.credits, Money::new(500));
        assert_eq!(report.rows.len(), 5);
        assert_eq!(report.rows[0].day, 5);
    }

    #[test]
    fn text_filter_matches_name_or_notes() {
        let by_name = LedgerFilter {
            text: Some("GLOBAL".to_string()),
            ..Default::default()
        };
        assert_eq!(report(sample(), &by_name).unwrap().rows.len(), 1);

        let by_notes = LedgerFilter {
            text: Some("container".to_string()),
            ..Default::default()
        };
        let report = report(sample(), &by_notes).unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.total.net, Money::new(1_200));
    }

    #[test]
    fn sums_past_the_money_limit_fail_instead_of_wrapping() {
        let rows = vec![
            row(Money::MAX.minor(), AccountType::Cash, 1),
            row(Money::MAX.minor(), AccountType::Cash, 2),
        ];
        assert!(matches!(
            aggregate(&rows),
            Err(crate::EngineError::InvalidAmount(_))
        ));
        assert!(report(rows.clone(), &LedgerFilter::default()).is_err());

        let credits = vec![row(i64::MIN, AccountType::Usd, 1)];
        assert!(report(credits, &LedgerFilter::default()).is_err());
    }
}
