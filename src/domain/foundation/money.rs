//! Money value object: a decimal amount paired with a currency.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Currencies accepted by the shop's payment gateways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Russian ruble (card checkout).
    Rub,
    /// US dollar (crypto invoices are denominated in USD).
    Usd,
    /// Telegram Stars.
    Xtr,
}

impl Currency {
    /// ISO-ish currency code as sent to providers.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Rub => "RUB",
            Currency::Usd => "USD",
            Currency::Xtr => "XTR",
        }
    }

    /// Display symbol for user-facing text.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Rub => "₽",
            Currency::Usd => "$",
            Currency::Xtr => "⭐",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RUB" => Ok(Currency::Rub),
            "USD" => Ok(Currency::Usd),
            "XTR" => Ok(Currency::Xtr),
            other => Err(ValidationError::invalid_format(
                "currency",
                format!("Unknown currency code: {}", other),
            )),
        }
    }
}

/// An amount of money in a specific currency.
///
/// Amounts use `rust_decimal` to avoid floating point drift; the zero and
/// negative range is representable (providers report refund deltas) but
/// payments themselves must be positive, which gateways enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: Currency,
}

impl Money {
    /// Creates a new amount.
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Returns true for amounts strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Renders the amount with two decimal places, the format the card
    /// provider's order API expects.
    pub fn to_provider_string(&self) -> String {
        format!("{:.2}", self.amount)
    }

    /// Truncates to whole currency units (Stars invoices take integers).
    pub fn whole_units(&self) -> i64 {
        use rust_decimal::prelude::ToPrimitive;
        self.amount.trunc().to_i64().unwrap_or(0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn positive_amount_is_positive() {
        let m = Money::new(dec("100.50"), Currency::Rub);
        assert!(m.is_positive());
    }

    #[test]
    fn zero_and_negative_are_not_positive() {
        assert!(!Money::new(Decimal::ZERO, Currency::Rub).is_positive());
        assert!(!Money::new(dec("-5"), Currency::Usd).is_positive());
    }

    #[test]
    fn provider_string_has_two_decimals() {
        let m = Money::new(dec("199.9"), Currency::Rub);
        assert_eq!(m.to_provider_string(), "199.90");
    }

    #[test]
    fn whole_units_truncates_fraction() {
        let m = Money::new(dec("100.50"), Currency::Xtr);
        assert_eq!(m.whole_units(), 100);
    }

    #[test]
    fn currency_codes_round_trip() {
        for c in [Currency::Rub, Currency::Usd, Currency::Xtr] {
            assert_eq!(c.code().parse::<Currency>().unwrap(), c);
        }
    }

    #[test]
    fn unknown_currency_is_rejected() {
        assert!("DOGE".parse::<Currency>().is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn provider_string_round_trips_any_positive_amount(
                units in 1i64..10_000_000,
                cents in 0i64..100,
            ) {
                let amount = Decimal::new(units * 100 + cents, 2);
                let money = Money::new(amount, Currency::Rub);

                prop_assert!(money.is_positive());
                let reparsed: Decimal = money.to_provider_string().parse().unwrap();
                prop_assert_eq!(reparsed, amount);
            }
        }
    }
}
