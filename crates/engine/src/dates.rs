//! Calendar-day ranges used by ledger reports and the financial log.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Inclusive range of calendar days, evaluated in UTC.
///
/// `[2024-01-01, 2024-01-01]` covers the whole of January 1st. Deserialising
/// goes through [`DateRange::new`], so a reversed range is an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = EngineError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.from, raw.to)
    }
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> ResultEngine<Self> {
        if from > to {
            return Err(EngineError::InvalidInput(
                "invalid range: from must be <= to".to_string(),
            ));
        }
        Ok(Self { from, to })
    }

    /// A range covering a single day.
    #[must_use]
    pub fn day(day: NaiveDate) -> Self {
        Self { from: day, to: day }
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let day = at.date_naive();
        self.from <= day && day <= self.to
    }
}

/// Preset periods offered by the representative financial log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "period", rename_all = "snake_case")]
pub enum Period {
    #[default]
    All,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom {
        range: DateRange,
    },
}

impl Period {
    /// Resolves the preset against `today`. `All` has no bounds.
    ///
    /// - `Daily`: today only
    /// - `Weekly`: the last 7 days, today included
    /// - `Monthly`: from the 1st of the current month to today
    /// - `Yearly`: from January 1st to today
    #[must_use]
    pub fn resolve(self, today: NaiveDate) -> Option<DateRange> {
        match self {
            Period::All => None,
            Period::Daily => Some(DateRange::day(today)),
            Period::Weekly => Some(DateRange {
                from: today.checked_sub_days(Days::new(6)).unwrap_or(NaiveDate::MIN),
                to: today,
            }),
            Period::Monthly => Some(DateRange {
                from: today.with_day(1).unwrap_or(today),
                to: today,
            }),
            Period::Yearly => Some(DateRange {
                from: today.with_ordinal(1).unwrap_or(today),
                to: today,
            }),
            Period::Custom { range } => Some(range),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn single_day_range_covers_whole_day() {
        let range = DateRange::day(day(2024, 3, 10));
        assert!(range.contains(Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap()));
        assert!(range.contains(Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap()));
    }

    #[test]
    fn reversed_range_is_rejected() {
        assert!(DateRange::new(day(2024, 3, 11), day(2024, 3, 10)).is_err());
    }

    #[test]
    fn deserialising_validates_the_bounds() {
        let range: DateRange =
            serde_json::from_str(r#"{"from":"2024-03-10","to":"2024-03-11"}"#).unwrap();
        assert_eq!(range, DateRange::new(day(2024, 3, 10), day(2024, 3, 11)).unwrap());

        let reversed = serde_json::from_str::<DateRange>(r#"{"from":"2024-03-11","to":"2024-03-10"}"#);
        assert!(reversed.is_err());

        let period = serde_json::from_str::<Period>(
            r#"{"period":"custom","range":{"from":"2024-03-11","to":"2024-03-10"}}"#,
        );
        assert!(period.is_err());
    }

    #[test]
    fn presets_resolve_against_today() {
        let today = day(2024, 3, 10);
        assert_eq!(Period::All.resolve(today), None);
        assert_eq!(Period::Daily.resolve(today), Some(DateRange::day(today)));
        assert_eq!(
            Period::Weekly.resolve(today),
            Some(DateRange { from: day(2024, 3, 4), to: today })
        );
        assert_eq!(
            Period::Monthly.resolve(today),
            Some(DateRange { from: day(2024, 3, 1), to: today })
        );
        assert_eq!(
            Period::Yearly.resolve(today),
            Some(DateRange { from: day(2024, 1, 1), to: today })
        );
    }
}
