//! Property-based integration tests for the challan payment ledger.
//!
//! These tests verify that ledger invariants hold across random payment
//! histories, using the `proptest` crate for random test case generation.

use academy_core::fees::ledger::{apply_payment, derive_status, settle_from_payments};
use academy_core::fees::{
    ChallanStatus, DiscountField, DiscountTerms, FeeChallan, FeeError, FeePayment, NewFeePayment,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use rust_decimal::Decimal;

// =============================================================================
// Generators
// =============================================================================

/// Amount in paisa, turned into a 2dp decimal.
fn arb_amount(max_cents: i64) -> impl Strategy<Value = Decimal> {
    (1i64..=max_cents).prop_map(|cents| Decimal::new(cents, 2))
}

/// Payment attempts; some are non-positive on purpose.
fn arb_attempts() -> impl Strategy<Value = Vec<Decimal>> {
    proptest::collection::vec(
        prop_oneof![
            4 => arb_amount(60_000),
            1 => (-500i64..=0).prop_map(|cents| Decimal::new(cents, 2)),
        ],
        0..20,
    )
}

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

fn challan(amount: Decimal) -> FeeChallan {
    FeeChallan {
        id: "ch-1".to_string(),
        academy_no: "ACD-1".to_string(),
        fee_plan_id: None,
        student_id: "stu-1".to_string(),
        program_id: "prog-1".to_string(),
        challan_number: "CH-202601-0001".to_string(),
        issue_date: base_date(),
        due_date: base_date(),
        amount,
        paid_amount: Decimal::ZERO,
        status: ChallanStatus::Pending,
        payment_date: None,
        payment_method: None,
        payment_reference: None,
        notes: None,
        version: 1,
        created_by: None,
        updated_by: None,
        created_at: NaiveDateTime::default(),
        updated_at: NaiveDateTime::default(),
    }
}

fn attempt(amount: Decimal, day: i64) -> NewFeePayment {
    NewFeePayment {
        challan_id: "ch-1".to_string(),
        amount,
        payment_date: base_date() + Duration::days(day),
        payment_method: None,
        payment_reference: None,
        notes: None,
    }
}

/// Applies attempts in order, returning the final challan and accepted payments.
fn replay(amount: Decimal, attempts: &[Decimal]) -> (FeeChallan, Vec<FeePayment>) {
    let mut current = challan(amount);
    let mut accepted = Vec::new();
    for (i, value) in attempts.iter().enumerate() {
        let new_payment = attempt(*value, i as i64);
        match apply_payment(&current, &new_payment) {
            Ok(settlement) => {
                current.paid_amount = settlement.paid_amount;
                current.status = settlement.status;
                current.payment_date = settlement.payment_date;
                accepted.push(FeePayment {
                    id: format!("pay-{}", i),
                    academy_no: current.academy_no.clone(),
                    challan_id: current.id.clone(),
                    student_id: current.student_id.clone(),
                    amount: new_payment.amount,
                    payment_date: new_payment.payment_date,
                    payment_method: None,
                    payment_reference: None,
                    notes: None,
                    created_by: None,
                    updated_by: None,
                    created_at: NaiveDateTime::default(),
                    updated_at: NaiveDateTime::default(),
                });
            }
            Err(FeeError::InvalidPaymentAmount { max_allowed, .. }) => {
                assert_eq!(max_allowed, current.amount - current.paid_amount);
            }
            Err(other) => panic!("unexpected ledger error {:?}", other),
        }
    }
    (current, accepted)
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Paid amount stays within [0, amount] and equals the sum of accepted
    /// payments, whatever the attempts were.
    #[test]
    fn prop_paid_amount_is_bounded_and_summed(
        amount in arb_amount(200_000),
        attempts in arb_attempts(),
    ) {
        let (current, accepted) = replay(amount, &attempts);

        prop_assert!(current.paid_amount >= Decimal::ZERO);
        prop_assert!(current.paid_amount <= current.amount);
        let sum: Decimal = accepted.iter().map(|p| p.amount).sum();
        prop_assert_eq!(current.paid_amount, sum);
        prop_assert!(accepted.iter().all(|p| p.amount > Decimal::ZERO));
    }

    /// Status always matches the derivation rule after each payment.
    #[test]
    fn prop_status_follows_paid_amount(
        amount in arb_amount(200_000),
        attempts in arb_attempts(),
    ) {
        let (current, _) = replay(amount, &attempts);
        prop_assert_eq!(current.status, derive_status(current.paid_amount, current.amount));
    }

    /// Deleting any one payment leaves the challan equal to replaying the
    /// remaining payments, in any order.
    #[test]
    fn prop_delete_matches_replay_of_remaining(
        amount in arb_amount(200_000),
        attempts in arb_attempts(),
        pick in any::<prop::sample::Index>(),
    ) {
        let (current, accepted) = replay(amount, &attempts);
        prop_assume!(!accepted.is_empty());

        let removed = pick.index(accepted.len());
        let mut remaining: Vec<FeePayment> = accepted
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != removed)
            .map(|(_, p)| p.clone())
            .collect();

        let forward = settle_from_payments(&current, &remaining);
        remaining.reverse();
        let backward = settle_from_payments(&current, &remaining);
        prop_assert_eq!(&forward, &backward);

        let expected: Decimal = remaining.iter().map(|p| p.amount).sum();
        prop_assert_eq!(forward.paid_amount, expected);
        prop_assert_eq!(forward.status, derive_status(expected, current.amount));
        prop_assert_eq!(
            forward.payment_date,
            remaining.iter().map(|p| p.payment_date).max()
        );
    }

    /// Discount terms computed from an amount edit satisfy the plan invariant.
    #[test]
    fn prop_discount_amount_edit_is_consistent(
        actual_fee in arb_amount(1_000_000),
        discount_cents in 0i64..=1_000_000,
    ) {
        let discount = Decimal::new(discount_cents, 2).min(actual_fee);
        let terms =
            DiscountTerms::from_edit(actual_fee, DiscountField::DiscountAmount, discount).unwrap();
        prop_assert!(terms.is_consistent());
        prop_assert!(terms.fee_after_discount >= Decimal::ZERO);
        prop_assert!(terms.discount_percent <= Decimal::ONE_HUNDRED);
    }
}
