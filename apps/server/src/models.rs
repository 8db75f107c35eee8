//! Request and response shapes that exist only on the HTTP surface.

use academy_core::fees::{ChallanStatus, FeeChallan, FeePayment, PaymentMethod};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of `POST /fee-challans/{id}/payments`; the challan comes from the path.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_method: Option<PaymentMethod>,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
}

/// The settled challan together with the payment just stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub challan: FeeChallan,
    pub payment: FeePayment,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: ChallanStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanQuery {
    pub student_id: Option<String>,
}

/// Challan list filters. `status` accepts a comma separated list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallanQuery {
    pub student_id: Option<String>,
    pub program_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryQuery {
    pub status: Option<String>,
}
