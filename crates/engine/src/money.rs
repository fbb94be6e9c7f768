use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Signed money amount represented as integer **minor units** (hundredths).
///
/// Every balance, price and payment in the engine uses this type so sums stay
/// exact. The sign follows the ledger convention:
/// - positive = debit, the counterparty owes more
/// - zero or negative = credit, the counterparty owes less / paid
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// assert!(amount.is_debit());
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
/// assert_eq!("-10,5".parse::<Money>().unwrap().minor(), -1050);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest magnitude accepted for an amount or a running total
    /// (10 000 000 000 000.00).
    pub const MAX: Money = Money(1_000_000_000_000_000);

    /// Creates a new amount from minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// A debit increases what the counterparty owes.
    #[must_use]
    pub const fn is_debit(self) -> bool {
        self.0 > 0
    }

    /// A credit decreases what the counterparty owes. Zero counts as credit.
    #[must_use]
    pub const fn is_credit(self) -> bool {
        self.0 <= 0
    }

    #[must_use]
    pub const fn is_within_limit(self) -> bool {
        -Self::MAX.0 <= self.0 && self.0 <= Self::MAX.0
    }

    /// Checked addition (returns `None` outside `[-MAX, MAX]`).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0
            .checked_add(rhs.0)
            .map(Money)
            .filter(|m| m.is_within_limit())
    }

    /// Checked subtraction (returns `None` outside `[-MAX, MAX]`).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0
            .checked_sub(rhs.0)
            .map(Money)
            .filter(|m| m.is_within_limit())
    }

    /// Checked negation (returns `None` outside `[-MAX, MAX]`).
    #[must_use]
    pub fn checked_neg(self) -> Option<Money> {
        self.0
            .checked_neg()
            .map(Money)
            .filter(|m| m.is_within_limit())
    }

    /// Fails with `InvalidAmount` unless `|self| <= MAX`.
    pub fn ensure_within_limit(self) -> ResultEngine<Money> {
        if self.is_within_limit() {
            Ok(self)
        } else {
            Err(out_of_range(self.0))
        }
    }

    pub fn try_add(self, rhs: Money) -> ResultEngine<Money> {
        self.checked_add(rhs)
            .ok_or_else(|| out_of_range(i128::from(self.0) + i128::from(rhs.0)))
    }

    pub fn try_neg(self) -> ResultEngine<Money> {
        self.checked_neg()
            .ok_or_else(|| out_of_range(-i128::from(self.0)))
    }

    /// Sums `amounts`, failing as soon as a partial sum leaves `[-MAX, MAX]`.
    pub fn try_sum<I: IntoIterator<Item = Money>>(amounts: I) -> ResultEngine<Money> {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, amount| acc.try_add(amount))
    }
}

fn out_of_range(minor: impl fmt::Display) -> EngineError {
    EngineError::InvalidAmount(format!(
        "amount {minor} (minor units) is outside the supported range of +/-{}",
        Money::MAX
    ))
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string into minor units.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    /// At most 2 fractional digits are allowed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let rest = rest.trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let (units_str, frac_str) = match rest.split_once('.') {
            Some((units, frac)) => (units, frac),
            None => (rest.as_str(), ""),
        };

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if !frac_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| overflow())?;
        let fraction: i64 = match frac_str.len() {
            0 => 0,
            1 => frac_str.parse::<i64>().map_err(|_| invalid())? * 10,
            2 => frac_str.parse::<i64>().map_err(|_| invalid())?,
            _ => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(fraction))
            .ok_or_else(overflow)?;

        Money(if negative { -total } else { total }).ensure_within_limit()
    }
}
