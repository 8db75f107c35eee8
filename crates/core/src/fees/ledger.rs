//! Challan payment ledger rules.
//!
//! These functions are pure: they take the current challan (and payments) and
//! return what the challan must look like after a payment event. Storage
//! applies the result inside a single transaction.

use rust_decimal::Decimal;

use super::fees_errors::FeeError;
use super::fees_model::{
    ChallanSettlement, ChallanStatus, FeeChallan, FeePayment, NewFeePayment,
};

/// Status implied by a paid amount against a challan amount.
pub fn derive_status(paid_amount: Decimal, amount: Decimal) -> ChallanStatus {
    if paid_amount >= amount {
        ChallanStatus::Paid
    } else if paid_amount > Decimal::ZERO {
        ChallanStatus::PartiallyPaid
    } else {
        ChallanStatus::Pending
    }
}

/// Checks a payment amount against what the challan still accepts.
pub fn validate_payment_amount(challan: &FeeChallan, amount: Decimal) -> Result<(), FeeError> {
    let max_allowed = challan.remaining_balance();
    if amount <= Decimal::ZERO || amount > max_allowed {
        return Err(FeeError::InvalidPaymentAmount {
            amount,
            max_allowed,
        });
    }
    Ok(())
}

/// Challan state after recording `payment`.
///
/// The payment's date, method and reference become the challan's latest
/// payment details; its notes replace the challan notes when present.
pub fn apply_payment(
    challan: &FeeChallan,
    payment: &NewFeePayment,
) -> Result<ChallanSettlement, FeeError> {
    validate_payment_amount(challan, payment.amount)?;

    let paid_amount = challan.paid_amount + payment.amount;
    Ok(ChallanSettlement {
        paid_amount,
        status: derive_status(paid_amount, challan.amount),
        payment_date: Some(payment.payment_date),
        payment_method: payment.payment_method,
        payment_reference: payment.payment_reference.clone(),
        notes: payment.notes.clone().or_else(|| challan.notes.clone()),
    })
}

/// Sum of payment amounts. Order does not matter.
pub fn total_paid(payments: &[FeePayment]) -> Decimal {
    payments.iter().map(|p| p.amount).sum()
}

/// Challan state rebuilt from the payments that remain after a deletion.
///
/// The paid amount is the sum of `remaining`, never a subtraction from the
/// old value. Latest payment details come from the most recent remaining
/// payment, or are cleared when none is left.
pub fn settle_from_payments(challan: &FeeChallan, remaining: &[FeePayment]) -> ChallanSettlement {
    let paid_amount = total_paid(remaining);
    let latest = remaining
        .iter()
        .max_by(|a, b| (a.payment_date, a.created_at).cmp(&(b.payment_date, b.created_at)));

    ChallanSettlement {
        paid_amount,
        status: derive_status(paid_amount, challan.amount),
        payment_date: latest.map(|p| p.payment_date),
        payment_method: latest.and_then(|p| p.payment_method),
        payment_reference: latest.and_then(|p| p.payment_reference.clone()),
        notes: challan.notes.clone(),
    }
}

/// Status a challan should carry after its amount is edited.
///
/// Rejects amounts that are not positive or fall below what was already paid.
/// Manually assigned statuses survive the edit.
pub fn status_after_amount_change(
    challan: &FeeChallan,
    new_amount: Decimal,
) -> Result<ChallanStatus, FeeError> {
    if new_amount <= Decimal::ZERO || new_amount < challan.paid_amount {
        return Err(FeeError::InvalidChallanAmount {
            amount: new_amount,
            paid_amount: challan.paid_amount,
        });
    }
    if challan.status.is_derived() {
        Ok(derive_status(challan.paid_amount, new_amount))
    } else {
        Ok(challan.status)
    }
}

/// A challan can only be deleted once all its payments are gone.
pub fn ensure_deletable(challan: &FeeChallan, payment_count: usize) -> Result<(), FeeError> {
    if payment_count > 0 {
        return Err(FeeError::ChallanHasPayments {
            challan_number: challan.challan_number.clone(),
            payment_count,
        });
    }
    Ok(())
}

/// Only the statuses the ledger never derives may be set by hand.
pub fn ensure_manual_status(status: ChallanStatus) -> Result<(), FeeError> {
    if status.is_derived() {
        return Err(FeeError::InvalidStatusAssignment(status));
    }
    Ok(())
}
