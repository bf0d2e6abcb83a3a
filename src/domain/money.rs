use crate::error::PaymentError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places the payment API accepts for monetary values.
pub const AMOUNT_SCALE: u32 = 2;

/// Rounds a monetary value to two decimal places, midpoint away from zero.
pub fn round(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncates `value` to at most `length` characters.
///
/// Counts Unicode scalar values, so multi-byte names are never cut mid-character.
pub fn fix_length(value: &str, length: usize) -> String {
    value.chars().take(length).collect()
}

/// Renders a tax rate the way it appears in titles and SKUs (`19`, `7.5`).
pub fn format_rate(rate: Decimal) -> String {
    rate.normalize().to_string()
}

/// A strictly positive monetary amount requested for a refund.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_midpoint_away_from_zero() {
        assert_eq!(round(dec!(1.005)), dec!(1.01));
        assert_eq!(round(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round(dec!(2.344)), dec!(2.34));
        assert_eq!(round(dec!(10)), dec!(10));
    }

    #[test]
    fn test_fix_length_counts_characters() {
        assert_eq!(fix_length("Grüße aus Zürich", 5), "Grüße");
        assert_eq!(fix_length("short", 40), "short");
        assert_eq!(fix_length("", 3), "");
    }

    #[test]
    fn test_format_rate_drops_trailing_zeros() {
        assert_eq!(format_rate(dec!(19.00)), "19");
        assert_eq!(format_rate(dec!(7.50)), "7.5");
        assert_eq!(format_rate(dec!(0)), "0");
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(PaymentError::ValidationError(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(PaymentError::ValidationError(_))
        ));
    }
}
