use rust_decimal::Decimal;
use thiserror::Error;

use super::fees_constants::format_amount;
use super::fees_model::ChallanStatus;

/// Ledger rule violations. All are recoverable by correcting input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeeError {
    /// Payment is not positive or would exceed the remaining balance.
    #[error("{}", invalid_payment_message(.amount, .max_allowed))]
    InvalidPaymentAmount {
        amount: Decimal,
        max_allowed: Decimal,
    },

    #[error(
        "Cannot delete challan {challan_number} with existing payments ({payment_count}). Please delete payments first."
    )]
    ChallanHasPayments {
        challan_number: String,
        payment_count: usize,
    },

    /// Challan amount is not positive or would fall below what was paid.
    #[error("{}", invalid_challan_amount_message(.amount, .paid_amount))]
    InvalidChallanAmount {
        amount: Decimal,
        paid_amount: Decimal,
    },

    #[error("Status '{0}' is derived from payments and cannot be assigned manually")]
    InvalidStatusAssignment(ChallanStatus),

    #[error("Challan {challan_id} was modified by someone else. Reload and try again.")]
    ConcurrentModification { challan_id: String },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
}

impl FeeError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        FeeError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

fn invalid_payment_message(amount: &Decimal, max_allowed: &Decimal) -> String {
    if *amount <= Decimal::ZERO {
        format!(
            "Payment amount must be greater than 0. Maximum: {}",
            format_amount(*max_allowed)
        )
    } else {
        format!(
            "Payment amount {} cannot exceed remaining balance. Maximum: {}",
            format_amount(*amount),
            format_amount(*max_allowed)
        )
    }
}

fn invalid_challan_amount_message(amount: &Decimal, paid_amount: &Decimal) -> String {
    if *amount <= Decimal::ZERO {
        "Challan amount must be greater than 0".to_string()
    } else {
        format!(
            "Challan amount {} cannot be less than the amount already paid ({})",
            format_amount(*amount),
            format_amount(*paid_amount)
        )
    }
}
