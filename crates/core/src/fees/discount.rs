//! Discount calculator for fee plans.
//!
//! A plan carries three discount fields that must agree with each other and
//! with the fixed actual fee. Whichever field staff edit drives the other two.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// The discount field that was edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscountField {
    DiscountAmount,
    DiscountPercent,
    FeeAfterDiscount,
}

/// Reconciled discount terms of a fee plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountTerms {
    pub actual_fee: Decimal,
    pub discount_amount: Decimal,
    pub discount_percent: Decimal,
    pub fee_after_discount: Decimal,
}

/// Request body for an ad-hoc recalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountCalculation {
    pub actual_fee: Decimal,
    pub field: DiscountField,
    pub value: Decimal,
}

impl DiscountTerms {
    /// Terms with no discount at all.
    pub fn undiscounted(actual_fee: Decimal) -> Self {
        Self {
            actual_fee,
            discount_amount: Decimal::ZERO,
            discount_percent: Decimal::ZERO,
            fee_after_discount: actual_fee.max(Decimal::ZERO),
        }
    }

    /// Recomputes the two other fields from the one just edited.
    ///
    /// Fails when the inputs push any field outside the decimal range.
    pub fn from_edit(
        actual_fee: Decimal,
        field: DiscountField,
        value: Decimal,
    ) -> Result<Self> {
        let (discount_amount, discount_percent, fee_after_discount) = match field {
            DiscountField::DiscountAmount => {
                let amount = value;
                let fee_after = in_range(actual_fee.checked_sub(amount))?;
                (amount, percent_of(amount, actual_fee)?, fee_after)
            }
            DiscountField::DiscountPercent => {
                let amount = in_range(
                    actual_fee
                        .checked_mul(value)
                        .and_then(|v| v.checked_div(HUNDRED)),
                )?;
                let fee_after = in_range(actual_fee.checked_sub(amount))?;
                (amount, value, fee_after)
            }
            DiscountField::FeeAfterDiscount => {
                let amount = in_range(actual_fee.checked_sub(value))?;
                (amount, percent_of(amount, actual_fee)?, value)
            }
        };

        Ok(Self {
            actual_fee,
            discount_amount: discount_amount.max(Decimal::ZERO),
            discount_percent: round_percent(discount_percent).max(Decimal::ZERO),
            fee_after_discount: fee_after_discount.max(Decimal::ZERO),
        })
    }

    pub fn from_calculation(calc: DiscountCalculation) -> Result<Self> {
        Self::from_edit(calc.actual_fee, calc.field, calc.value)
    }

    /// Terms driven by a discount amount, the form plans are stored from.
    pub fn from_discount_amount(actual_fee: Decimal, discount_amount: Decimal) -> Result<Self> {
        Self::from_edit(actual_fee, DiscountField::DiscountAmount, discount_amount)
    }

    /// True when the stored fields satisfy the plan invariant.
    pub fn is_consistent(&self) -> bool {
        let percent_matches = percent_of(self.discount_amount, self.actual_fee)
            .map_or(false, |percent| self.discount_percent == round_percent(percent));
        self.actual_fee.checked_sub(self.discount_amount) == Some(self.fee_after_discount)
            && percent_matches
    }
}

fn in_range(value: Option<Decimal>) -> Result<Decimal> {
    value.ok_or_else(|| {
        Error::Validation(ValidationError::InvalidInput(
            "Discount values are out of range".to_string(),
        ))
    })
}

fn percent_of(amount: Decimal, actual_fee: Decimal) -> Result<Decimal> {
    if actual_fee > Decimal::ZERO {
        in_range(
            amount
                .checked_div(actual_fee)
                .and_then(|ratio| ratio.checked_mul(HUNDRED)),
        )
    } else {
        Ok(Decimal::ZERO)
    }
}

fn round_percent(percent: Decimal) -> Decimal {
    percent.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_edit_percent_derives_amount_and_fee() {
        let terms =
            DiscountTerms::from_edit(dec!(5000), DiscountField::DiscountPercent, dec!(10))
                .unwrap();
        assert_eq!(terms.discount_amount, dec!(500.00));
        assert_eq!(terms.fee_after_discount, dec!(4500.00));
        assert_eq!(terms.discount_percent, dec!(10));
    }

    #[test]
    fn test_edit_amount_derives_percent_rounded() {
        let terms =
            DiscountTerms::from_edit(dec!(3000), DiscountField::DiscountAmount, dec!(1000))
                .unwrap();
        assert_eq!(terms.fee_after_discount, dec!(2000));
        assert_eq!(terms.discount_percent, dec!(33.33));
    }

    #[test]
    fn test_edit_fee_after_discount_derives_amount() {
        let terms =
            DiscountTerms::from_edit(dec!(8000), DiscountField::FeeAfterDiscount, dec!(6000))
                .unwrap();
        assert_eq!(terms.discount_amount, dec!(2000));
        assert_eq!(terms.discount_percent, dec!(25));
        assert_eq!(terms.fee_after_discount, dec!(6000));
    }

    #[test]
    fn test_zero_actual_fee_gives_zero_percent() {
        let terms =
            DiscountTerms::from_edit(Decimal::ZERO, DiscountField::DiscountAmount, dec!(50))
                .unwrap();
        assert_eq!(terms.discount_percent, Decimal::ZERO);
        assert_eq!(terms.fee_after_discount, Decimal::ZERO);
    }

    #[test]
    fn test_values_are_clamped_at_zero() {
        let over =
            DiscountTerms::from_edit(dec!(1000), DiscountField::DiscountAmount, dec!(1500))
                .unwrap();
        assert_eq!(over.fee_after_discount, Decimal::ZERO);

        let above_fee =
            DiscountTerms::from_edit(dec!(1000), DiscountField::FeeAfterDiscount, dec!(1200))
                .unwrap();
        assert_eq!(above_fee.discount_amount, Decimal::ZERO);
        assert_eq!(above_fee.discount_percent, Decimal::ZERO);
    }

    #[test]
    fn test_percent_rounds_midpoint_away_from_zero() {
        // 1 of 800 is exactly 0.125%
        let terms =
            DiscountTerms::from_edit(dec!(800), DiscountField::DiscountAmount, dec!(1))
                .unwrap();
        assert_eq!(terms.discount_percent, dec!(0.13));
    }

    #[test]
    fn test_overflowing_inputs_are_rejected() {
        let huge_fee = Decimal::from_str_exact("70000000000000000000000000000").unwrap();
        let err = DiscountTerms::from_edit(huge_fee, DiscountField::DiscountPercent, dec!(100))
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));

        let tiny_fee = dec!(0.0000001);
        assert!(
            DiscountTerms::from_edit(tiny_fee, DiscountField::DiscountAmount, huge_fee).is_err()
        );
        assert!(DiscountTerms::from_edit(
            Decimal::MAX,
            DiscountField::FeeAfterDiscount,
            Decimal::MIN
        )
        .is_err());
    }

    #[test]
    fn test_consistency_check() {
        let terms = DiscountTerms::from_discount_amount(dec!(5000), dec!(500)).unwrap();
        assert!(terms.is_consistent());

        let broken = DiscountTerms {
            fee_after_discount: dec!(4000),
            ..terms
        };
        assert!(!broken.is_consistent());
        assert!(DiscountTerms::undiscounted(dec!(1200)).is_consistent());
    }
}
