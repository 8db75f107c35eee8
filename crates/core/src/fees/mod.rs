//! Fees module - fee plans, challans, payments and the ledger rules tying them.

mod challan_number;
mod discount;
mod fees_constants;
mod fees_errors;
mod fees_model;
mod fees_service;
mod fees_traits;
pub mod ledger;


#[cfg(test)]
mod fees_model_tests;

pub use challan_number::{format_challan_number, generate_challan_number, generate_distinct};
pub use discount::{DiscountCalculation, DiscountField, DiscountTerms};
pub use fees_constants::*;
pub use fees_errors::FeeError;
pub use fees_model::{
    ChallanEdit, ChallanFilter, ChallanSettlement, ChallanStatus, ChallanUpdate, ChallanView,
    DiscountType, FeeChallan, FeePayment, FeePlan, FeePlanDraft, FeePlanUpdate, FeeSummary,
    GenerateChallansRequest, NewFeeChallan, NewFeePayment, NewFeePlan, PaymentMethod,
    PaymentPosting,
};
pub use fees_service::FeeService;
pub use fees_traits::{
    FeeChallanRepositoryTrait, FeePaymentRepositoryTrait, FeePlanRepositoryTrait, FeeServiceTrait,
};
