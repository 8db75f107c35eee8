//! Fee plan, challan and payment domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::discount::DiscountTerms;
use crate::errors::{Error, Result, ValidationError};

/// Lifecycle status of a fee challan.
///
/// `Pending`, `PartiallyPaid` and `Paid` are derived from the paid amount by
/// the ledger. `Overdue` and `Cancelled` are only ever assigned by staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChallanStatus {
    #[default]
    Pending,
    PartiallyPaid,
    Paid,
    Overdue,
    Cancelled,
}

impl ChallanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallanStatus::Pending => "pending",
            ChallanStatus::PartiallyPaid => "partially_paid",
            ChallanStatus::Paid => "paid",
            ChallanStatus::Overdue => "overdue",
            ChallanStatus::Cancelled => "cancelled",
        }
    }

    /// True for the statuses the ledger computes from the paid amount.
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            ChallanStatus::Pending | ChallanStatus::PartiallyPaid | ChallanStatus::Paid
        )
    }

    /// True for the statuses that still expect money from the student.
    pub fn is_outstanding(&self) -> bool {
        matches!(
            self,
            ChallanStatus::Pending | ChallanStatus::PartiallyPaid | ChallanStatus::Overdue
        )
    }
}

impl fmt::Display for ChallanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChallanStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(ChallanStatus::Pending),
            "partially_paid" => Ok(ChallanStatus::PartiallyPaid),
            "paid" => Ok(ChallanStatus::Paid),
            "overdue" => Ok(ChallanStatus::Overdue),
            "cancelled" => Ok(ChallanStatus::Cancelled),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown challan status '{}'",
                other
            )))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    BankTransfer,
    Cheque,
    Online,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::Online => "online",
            PaymentMethod::Other => "other",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "cheque" => Ok(PaymentMethod::Cheque),
            "online" => Ok(PaymentMethod::Online),
            "other" => Ok(PaymentMethod::Other),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown payment method '{}'",
                other
            )))),
        }
    }
}

/// Why a student was given a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscountType {
    Siblings,
    Merit,
    #[serde(rename = "Need-based")]
    NeedBased,
    Staff,
    #[serde(rename = "Early Payment")]
    EarlyPayment,
    #[serde(rename = "Bulk Payment")]
    BulkPayment,
    Other,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Siblings => "Siblings",
            DiscountType::Merit => "Merit",
            DiscountType::NeedBased => "Need-based",
            DiscountType::Staff => "Staff",
            DiscountType::EarlyPayment => "Early Payment",
            DiscountType::BulkPayment => "Bulk Payment",
            DiscountType::Other => "Other",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Siblings" => Ok(DiscountType::Siblings),
            "Merit" => Ok(DiscountType::Merit),
            "Need-based" => Ok(DiscountType::NeedBased),
            "Staff" => Ok(DiscountType::Staff),
            "Early Payment" => Ok(DiscountType::EarlyPayment),
            "Bulk Payment" => Ok(DiscountType::BulkPayment),
            "Other" => Ok(DiscountType::Other),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown discount type '{}'",
                other
            )))),
        }
    }
}

// ==================== Fee plans ====================

/// A student's agreed fee for one program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeePlan {
    pub id: String,
    pub academy_no: String,
    pub student_id: String,
    pub program_id: String,
    pub actual_fee: Decimal,
    pub discount_amount: Decimal,
    pub discount_percent: Decimal,
    pub fee_after_discount: Decimal,
    pub effective_from: NaiveDate,
    pub discount_type: Option<DiscountType>,
    pub discount_reason: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a fee plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeePlan {
    pub student_id: String,
    pub program_id: String,
    /// Defaults to the program's catalog fee when absent.
    pub actual_fee: Option<Decimal>,
    #[serde(default)]
    pub discount_amount: Decimal,
    pub effective_from: NaiveDate,
    pub discount_type: Option<DiscountType>,
    pub discount_reason: Option<String>,
    pub notes: Option<String>,
}

impl NewFeePlan {
    pub fn validate(&self) -> Result<()> {
        if self.student_id.trim().is_empty() || self.program_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Please select both student and program".to_string(),
            )));
        }
        if self.discount_amount.is_sign_negative() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Discount amount cannot be negative".to_string(),
            )));
        }
        Ok(())
    }
}

/// Input model for editing a fee plan. Student and program stay fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeePlanUpdate {
    pub id: Option<String>,
    pub actual_fee: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
    pub effective_from: NaiveDate,
    pub discount_type: Option<DiscountType>,
    pub discount_reason: Option<String>,
    pub notes: Option<String>,
}

impl FeePlanUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.as_deref().map_or(true, |id| id.trim().is_empty()) {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Fee plan ID is required for updates".to_string(),
            )));
        }
        if self.discount_amount.is_sign_negative() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Discount amount cannot be negative".to_string(),
            )));
        }
        Ok(())
    }
}

/// A fee plan ready to persist, with discount fields already reconciled.
#[derive(Debug, Clone, PartialEq)]
pub struct FeePlanDraft {
    pub student_id: String,
    pub program_id: String,
    pub terms: DiscountTerms,
    pub effective_from: NaiveDate,
    pub discount_type: Option<DiscountType>,
    pub discount_reason: Option<String>,
    pub notes: Option<String>,
}

// ==================== Challans ====================

/// A billing instrument issued from a fee plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeChallan {
    pub id: String,
    pub academy_no: String,
    /// Cleared when the originating plan is deleted.
    pub fee_plan_id: Option<String>,
    pub student_id: String,
    pub program_id: String,
    pub challan_number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub paid_amount: Decimal,
    pub status: ChallanStatus,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
    /// Incremented on every write; guards concurrent edits.
    pub version: i64,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl FeeChallan {
    /// Amount still owed, never negative.
    pub fn remaining_balance(&self) -> Decimal {
        (self.amount - self.paid_amount).max(Decimal::ZERO)
    }

    pub fn is_fully_paid(&self) -> bool {
        self.status == ChallanStatus::Paid && self.paid_amount >= self.amount
    }
}

/// A challan row to insert. Paid amount, status and version start at
/// zero, pending and one.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeeChallan {
    pub fee_plan_id: String,
    pub student_id: String,
    pub program_id: String,
    pub challan_number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub notes: Option<String>,
}

/// Request to issue challans for a selection of fee plans.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateChallansRequest {
    pub fee_plan_ids: Vec<String>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
}

impl GenerateChallansRequest {
    pub fn validate(&self) -> Result<()> {
        if self.fee_plan_ids.is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Please select at least one fee plan".to_string(),
            )));
        }
        validate_date_order(self.issue_date, self.due_date)
    }
}

/// Staff edit of a challan's terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallanUpdate {
    pub id: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub notes: Option<String>,
    /// Version the editor last saw; the edit is refused if it moved on.
    pub expected_version: Option<i64>,
}

impl ChallanUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.as_deref().map_or(true, |id| id.trim().is_empty()) {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Challan ID is required for updates".to_string(),
            )));
        }
        validate_date_order(self.issue_date, self.due_date)
    }
}

/// Resolved challan edit handed to storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallanEdit {
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub status: ChallanStatus,
    pub notes: Option<String>,
}

/// Filter for listing challans. Empty fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallanFilter {
    pub student_id: Option<String>,
    pub program_id: Option<String>,
    pub statuses: Option<Vec<ChallanStatus>>,
}

impl ChallanFilter {
    pub fn for_student(student_id: impl Into<String>) -> Self {
        Self {
            student_id: Some(student_id.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, challan: &FeeChallan) -> bool {
        self.student_id
            .as_ref()
            .map_or(true, |id| *id == challan.student_id)
            && self
                .program_id
                .as_ref()
                .map_or(true, |id| *id == challan.program_id)
            && self
                .statuses
                .as_ref()
                .map_or(true, |statuses| statuses.contains(&challan.status))
    }
}

/// A challan with display names resolved for listing screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallanView {
    #[serde(flatten)]
    pub challan: FeeChallan,
    pub student_name: String,
    pub program_name: String,
}

/// Outstanding and collected totals for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSummary {
    pub student_id: String,
    pub total_pending: Decimal,
    pub total_paid: Decimal,
    pub total: Decimal,
    pub outstanding_challans: usize,
    pub paid_challans: usize,
}

// ==================== Payments ====================

/// One settlement recorded against a challan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeePayment {
    pub id: String,
    pub academy_no: String,
    pub challan_id: String,
    pub student_id: String,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_method: Option<PaymentMethod>,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for recording a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeePayment {
    pub challan_id: String,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_method: Option<PaymentMethod>,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
}

/// Challan columns the ledger rewrites after a payment event.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallanSettlement {
    pub paid_amount: Decimal,
    pub status: ChallanStatus,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
}

/// Everything storage needs to commit a payment atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentPosting {
    pub challan_id: String,
    pub student_id: String,
    /// Challan version the settlement was computed from.
    pub expected_version: i64,
    pub settlement: ChallanSettlement,
    pub payment: NewFeePayment,
}

fn validate_date_order(issue_date: NaiveDate, due_date: NaiveDate) -> Result<()> {
    if due_date < issue_date {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Due date {} cannot be before issue date {}",
            due_date, issue_date
        ))));
    }
    Ok(())
}
