use serde::{Deserialize, Serialize};

use crate::{EngineError, Money};

/// Currency a group keeps its books in.
///
/// Every amount recorded in a group (expenses, splits, settlements) is stored
/// as an `i64` number of **minor units** of the group currency (see `Money`),
/// so a group never mixes currencies.
///
/// All supported currencies use 2 minor units: `10.50 EUR` ⇄ `1050`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Gbp,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Eur => "€",
            Currency::Usd => "$",
            Currency::Gbp => "£",
        }
    }

    /// Formats an amount for display, e.g. `-10.50€` or `$3.00`.
    #[must_use]
    pub fn format(self, amount: Money) -> String {
        match self {
            Currency::Eur => format!("{amount}{}", self.symbol()),
            Currency::Usd | Currency::Gbp => {
                let sign = if amount.is_negative() { "-" } else { "" };
                format!("{sign}{}{}", self.symbol(), amount.abs())
            }
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
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            "GBP" => Ok(Currency::Gbp),
            other => Err(EngineError::CurrencyMismatch(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!(Currency::try_from(" eur ").unwrap(), Currency::Eur);
        assert_eq!(Currency::try_from("Usd").unwrap(), Currency::Usd);
        assert!(Currency::try_from("JPY").is_err());
    }

    #[test]
    fn formats_with_symbol() {
        assert_eq!(Currency::Eur.format(Money::new(-1050)), "-10.50€");
        assert_eq!(Currency::Usd.format(Money::new(300)), "$3.00");
        assert_eq!(Currency::Gbp.format(Money::new(-5)), "-£0.05");
    }
}
