//! Database models for the fee ledger.
//!
//! Money columns are stored as TEXT to keep decimal precision; enum columns
//! hold the snake_case / label form used on the wire.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::utils::{parse_decimal_tolerant, parse_enum_tolerant, parse_optional_enum};
use academy_core::fees::{
    ChallanEdit, ChallanSettlement, FeeChallan, FeePayment, FeePlan, FeePlanDraft,
};

/// Database model for fee plans
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::fee_plans)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FeePlanDB {
    pub id: String,
    pub academy_no: String,
    pub student_id: String,
    pub program_id: String,
    pub actual_fee: String,
    pub discount_amount: String,
    pub discount_percent: String,
    pub fee_after_discount: String,
    pub effective_from: NaiveDate,
    pub discount_type: Option<String>,
    pub discount_reason: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Columns rewritten when a plan is edited.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::fee_plans)]
#[diesel(treat_none_as_null = true)]
pub struct FeePlanChangeset {
    pub actual_fee: String,
    pub discount_amount: String,
    pub discount_percent: String,
    pub fee_after_discount: String,
    pub effective_from: NaiveDate,
    pub discount_type: Option<String>,
    pub discount_reason: Option<String>,
    pub notes: Option<String>,
    pub updated_by: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl FeePlanDB {
    pub fn from_draft(
        id: String,
        academy_no: String,
        user_id: Option<String>,
        draft: FeePlanDraft,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            academy_no,
            student_id: draft.student_id,
            program_id: draft.program_id,
            actual_fee: draft.terms.actual_fee.to_string(),
            discount_amount: draft.terms.discount_amount.to_string(),
            discount_percent: draft.terms.discount_percent.to_string(),
            fee_after_discount: draft.terms.fee_after_discount.to_string(),
            effective_from: draft.effective_from,
            discount_type: draft.discount_type.map(|t| t.as_str().to_string()),
            discount_reason: draft.discount_reason,
            notes: draft.notes,
            created_by: user_id.clone(),
            updated_by: user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

impl FeePlanChangeset {
    pub fn from_draft(user_id: Option<String>, draft: FeePlanDraft) -> Self {
        Self {
            actual_fee: draft.terms.actual_fee.to_string(),
            discount_amount: draft.terms.discount_amount.to_string(),
            discount_percent: draft.terms.discount_percent.to_string(),
            fee_after_discount: draft.terms.fee_after_discount.to_string(),
            effective_from: draft.effective_from,
            discount_type: draft.discount_type.map(|t| t.as_str().to_string()),
            discount_reason: draft.discount_reason,
            notes: draft.notes,
            updated_by: user_id,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

impl From<FeePlanDB> for FeePlan {
    fn from(db: FeePlanDB) -> Self {
        Self {
            actual_fee: parse_decimal_tolerant(&db.actual_fee, "actual_fee"),
            discount_amount: parse_decimal_tolerant(&db.discount_amount, "discount_amount"),
            discount_percent: parse_decimal_tolerant(&db.discount_percent, "discount_percent"),
            fee_after_discount: parse_decimal_tolerant(
                &db.fee_after_discount,
                "fee_after_discount",
            ),
            discount_type: parse_optional_enum(db.discount_type.as_deref(), "discount_type"),
            id: db.id,
            academy_no: db.academy_no,
            student_id: db.student_id,
            program_id: db.program_id,
            effective_from: db.effective_from,
            discount_reason: db.discount_reason,
            notes: db.notes,
            created_by: db.created_by,
            updated_by: db.updated_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Database model for fee challans
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::fee_challans)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FeeChallanDB {
    pub id: String,
    pub academy_no: String,
    pub fee_plan_id: Option<String>,
    pub student_id: String,
    pub program_id: String,
    pub challan_number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: String,
    pub paid_amount: String,
    pub status: String,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
    pub version: i64,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<FeeChallanDB> for FeeChallan {
    fn from(db: FeeChallanDB) -> Self {
        Self {
            amount: parse_decimal_tolerant(&db.amount, "amount"),
            paid_amount: parse_decimal_tolerant(&db.paid_amount, "paid_amount"),
            status: parse_enum_tolerant(&db.status, "challan status"),
            payment_method: parse_optional_enum(db.payment_method.as_deref(), "payment_method"),
            id: db.id,
            academy_no: db.academy_no,
            fee_plan_id: db.fee_plan_id,
            student_id: db.student_id,
            program_id: db.program_id,
            challan_number: db.challan_number,
            issue_date: db.issue_date,
            due_date: db.due_date,
            payment_date: db.payment_date,
            payment_reference: db.payment_reference,
            notes: db.notes,
            version: db.version,
            created_by: db.created_by,
            updated_by: db.updated_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Columns rewritten by a staff edit of a challan.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::fee_challans)]
#[diesel(treat_none_as_null = true)]
pub struct ChallanEditChangeset {
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: String,
    pub status: String,
    pub notes: Option<String>,
    pub updated_by: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl ChallanEditChangeset {
    pub fn new(user_id: Option<String>, edit: ChallanEdit) -> Self {
        Self {
            issue_date: edit.issue_date,
            due_date: edit.due_date,
            amount: edit.amount.to_string(),
            status: edit.status.as_str().to_string(),
            notes: edit.notes,
            updated_by: user_id,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Columns the ledger rewrites after a payment is recorded or deleted.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::fee_challans)]
#[diesel(treat_none_as_null = true)]
pub struct SettlementChangeset {
    pub paid_amount: String,
    pub status: String,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
    pub updated_by: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl SettlementChangeset {
    pub fn new(user_id: Option<String>, settlement: ChallanSettlement) -> Self {
        Self {
            paid_amount: settlement.paid_amount.to_string(),
            status: settlement.status.as_str().to_string(),
            payment_date: settlement.payment_date,
            payment_method: settlement.payment_method.map(|m| m.as_str().to_string()),
            payment_reference: settlement.payment_reference,
            notes: settlement.notes,
            updated_by: user_id,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Database model for fee payments
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::fee_payments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FeePaymentDB {
    pub id: String,
    pub academy_no: String,
    pub challan_id: String,
    pub student_id: String,
    pub amount: String,
    pub payment_date: NaiveDate,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<FeePaymentDB> for FeePayment {
    fn from(db: FeePaymentDB) -> Self {
        Self {
            amount: parse_decimal_tolerant(&db.amount, "payment amount"),
            payment_method: parse_optional_enum(db.payment_method.as_deref(), "payment_method"),
            id: db.id,
            academy_no: db.academy_no,
            challan_id: db.challan_id,
            student_id: db.student_id,
            payment_date: db.payment_date,
            payment_reference: db.payment_reference,
            notes: db.notes,
            created_by: db.created_by,
            updated_by: db.updated_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
