//! Tests for fee domain models: wire names, filters and input validation.

#[cfg(test)]
mod tests {
    use crate::fees::{
        ChallanFilter, ChallanSettlement, ChallanStatus, ChallanUpdate, DiscountType,
        FeeChallan, GenerateChallansRequest, NewFeePayment, NewFeePlan, PaymentMethod,
        PaymentPosting,
    };
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn challan(student_id: &str, program_id: &str, status: ChallanStatus) -> FeeChallan {
        FeeChallan {
            id: "ch-1".to_string(),
            academy_no: "ACD-1".to_string(),
            fee_plan_id: None,
            student_id: student_id.to_string(),
            program_id: program_id.to_string(),
            challan_number: "CH-202604-0420".to_string(),
            issue_date: date(4, 1),
            due_date: date(4, 10),
            amount: dec!(1000),
            paid_amount: Decimal::ZERO,
            status,
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

    // ==================== Enum wire names ====================

    #[test]
    fn test_challan_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ChallanStatus::PartiallyPaid).unwrap(),
            "\"partially_paid\""
        );
        assert_eq!(
            serde_json::from_str::<ChallanStatus>("\"overdue\"").unwrap(),
            ChallanStatus::Overdue
        );
        assert_eq!(ChallanStatus::default(), ChallanStatus::Pending);
    }

    #[test]
    fn test_status_from_str_matches_display() {
        for status in [
            ChallanStatus::Pending,
            ChallanStatus::PartiallyPaid,
            ChallanStatus::Paid,
            ChallanStatus::Overdue,
            ChallanStatus::Cancelled,
        ] {
            assert_eq!(ChallanStatus::from_str(&status.to_string()).unwrap(), status);
        }
        assert!(ChallanStatus::from_str("settled").is_err());
    }

    #[test]
    fn test_payment_method_serialization() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::BankTransfer).unwrap(),
            "\"bank_transfer\""
        );
        assert_eq!(
            PaymentMethod::from_str("cheque").unwrap(),
            PaymentMethod::Cheque
        );
    }

    #[test]
    fn test_discount_type_uses_display_labels() {
        assert_eq!(
            serde_json::to_string(&DiscountType::NeedBased).unwrap(),
            "\"Need-based\""
        );
        assert_eq!(
            serde_json::from_str::<DiscountType>("\"Early Payment\"").unwrap(),
            DiscountType::EarlyPayment
        );
        assert_eq!(
            DiscountType::from_str("Bulk Payment").unwrap(),
            DiscountType::BulkPayment
        );
        assert!(DiscountType::from_str("bulk_payment").is_err());
    }

    // ==================== Challan helpers ====================

    #[test]
    fn test_challan_serializes_camel_case() {
        let value = serde_json::to_value(challan("stu-1", "prog-1", ChallanStatus::Pending)).unwrap();
        assert_eq!(value["challanNumber"], "CH-202604-0420");
        assert_eq!(value["status"], "pending");
        assert!(value.get("paidAmount").is_some());
    }

    #[test]
    fn test_remaining_balance_never_negative() {
        let mut c = challan("stu-1", "prog-1", ChallanStatus::Paid);
        c.paid_amount = dec!(1000);
        assert_eq!(c.remaining_balance(), Decimal::ZERO);
        assert!(c.is_fully_paid());

        c.paid_amount = dec!(250.50);
        assert_eq!(c.remaining_balance(), dec!(749.50));
    }

    #[test]
    fn test_filter_matches() {
        let c = challan("stu-1", "prog-1", ChallanStatus::Overdue);
        assert!(ChallanFilter::default().matches(&c));
        assert!(ChallanFilter::for_student("stu-1").matches(&c));
        assert!(!ChallanFilter::for_student("stu-2").matches(&c));

        let by_status = ChallanFilter {
            statuses: Some(vec![ChallanStatus::Pending, ChallanStatus::PartiallyPaid]),
            ..Default::default()
        };
        assert!(!by_status.matches(&c));

        let by_program = ChallanFilter {
            program_id: Some("prog-1".to_string()),
            statuses: Some(vec![ChallanStatus::Overdue]),
            ..Default::default()
        };
        assert!(by_program.matches(&c));
    }

    #[test]
    fn test_payment_postings_compare_by_value() {
        let payment = NewFeePayment {
            challan_id: "ch-1".to_string(),
            amount: dec!(400),
            payment_date: date(4, 5),
            payment_method: Some(PaymentMethod::Cash),
            payment_reference: None,
            notes: None,
        };
        let posting = PaymentPosting {
            challan_id: "ch-1".to_string(),
            student_id: "stu-1".to_string(),
            expected_version: 1,
            settlement: ChallanSettlement {
                paid_amount: dec!(400),
                status: ChallanStatus::PartiallyPaid,
                payment_date: Some(date(4, 5)),
                payment_method: Some(PaymentMethod::Cash),
                payment_reference: None,
                notes: None,
            },
            payment: payment.clone(),
        };
        assert_eq!(posting.clone(), posting);

        let other = PaymentPosting {
            payment: NewFeePayment {
                amount: dec!(500),
                ..payment
            },
            ..posting.clone()
        };
        assert_ne!(other, posting);
    }

    // ==================== Input validation ====================

    #[test]
    fn test_new_plan_requires_student_and_program() {
        let plan = NewFeePlan {
            student_id: "stu-1".to_string(),
            program_id: " ".to_string(),
            actual_fee: None,
            discount_amount: Decimal::ZERO,
            effective_from: date(1, 1),
            discount_type: None,
            discount_reason: None,
            notes: None,
        };
        let err = plan.validate().unwrap_err();
        assert!(err.to_string().contains("Please select both student and program"));
    }

    #[test]
    fn test_new_plan_deserializes_without_discount() {
        let plan: NewFeePlan = serde_json::from_str(
            r#"{"studentId":"stu-1","programId":"prog-1","effectiveFrom":"2026-01-01"}"#,
        )
        .unwrap();
        assert_eq!(plan.discount_amount, Decimal::ZERO);
        assert!(plan.actual_fee.is_none());
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_generate_request_validation() {
        let empty = GenerateChallansRequest {
            fee_plan_ids: vec![],
            issue_date: date(5, 1),
            due_date: date(5, 10),
            notes: None,
        };
        assert!(empty
            .validate()
            .unwrap_err()
            .to_string()
            .contains("Please select at least one fee plan"));

        let reversed = GenerateChallansRequest {
            fee_plan_ids: vec!["plan-1".to_string()],
            issue_date: date(5, 10),
            due_date: date(5, 1),
            notes: None,
        };
        assert!(reversed.validate().is_err());

        let same_day = GenerateChallansRequest {
            due_date: date(5, 10),
            ..reversed
        };
        assert!(same_day.validate().is_ok());
    }

    #[test]
    fn test_challan_update_requires_id() {
        let update = ChallanUpdate {
            id: None,
            issue_date: date(5, 1),
            due_date: date(5, 10),
            amount: dec!(100),
            notes: None,
            expected_version: None,
        };
        assert!(update.validate().is_err());
    }
}
