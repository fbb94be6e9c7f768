use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Currency a creditor reports its balance in.
///
/// Amounts are always stored as `i64` minor units (see `Money`); the
/// currency only tags which unit a counterparty's figures are read in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Lyd,
    Usd,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Lyd => "LYD",
            Currency::Usd => "USD",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Lyd | Currency::Usd => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LYD" => Ok(Currency::Lyd),
            "USD" => Ok(Currency::Usd),
            other => Err(EngineError::InvalidInput(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

/// Account bucket a ledger entry affects.
///
/// A creditor's entries may land in any bucket regardless of the creditor's
/// nominal [`Currency`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Cash,
    Bank,
    Usd,
}

impl AccountType {
    pub const ALL: [AccountType; 3] = [AccountType::Cash, AccountType::Bank, AccountType::Usd];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::Usd => "usd",
        }
    }

    /// Reads a stored bucket. Entries written before buckets existed carry no
    /// value (or an unknown one) and count as `cash`.
    #[must_use]
    pub fn from_stored(value: Option<&str>) -> Self {
        value
            .and_then(|v| AccountType::try_from(v).ok())
            .unwrap_or_default()
    }
}

impl TryFrom<&str> for AccountType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "bank" => Ok(Self::Bank),
            "usd" => Ok(Self::Usd),
            other => Err(EngineError::InvalidInput(format!(
                "invalid account type: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_unknown_bucket_is_cash() {
        assert_eq!(AccountType::from_stored(None), AccountType::Cash);
        assert_eq!(AccountType::from_stored(Some("")), AccountType::Cash);
        assert_eq!(AccountType::from_stored(Some("crypto")), AccountType::Cash);
        assert_eq!(AccountType::from_stored(Some("bank")), AccountType::Bank);
        assert_eq!(AccountType::from_stored(Some("USD")), AccountType::Usd);
    }

    #[test]
    fn currency_codes_round_trip() {
        assert_eq!(Currency::try_from("lyd").unwrap(), Currency::Lyd);
        assert_eq!(Currency::try_from(Currency::Usd.code()).unwrap(), Currency::Usd);
        assert!(Currency::try_from("EUR").is_err());
        assert_eq!(Currency::Lyd.minor_units(), 2);
    }
}
