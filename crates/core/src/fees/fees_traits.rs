//! Fee repository and service traits.
//!
//! These traits define the contract for fee operations without any
//! database-specific types, allowing for different storage implementations.
//! Every repository call is scoped to one academy.

use async_trait::async_trait;
use std::collections::HashSet;

use super::discount::{DiscountCalculation, DiscountTerms};
use super::fees_model::{
    ChallanEdit, ChallanFilter, ChallanStatus, ChallanUpdate, ChallanView, FeeChallan, FeePayment,
    FeePlan, FeePlanDraft, FeePlanUpdate, FeeSummary, GenerateChallansRequest, NewFeeChallan,
    NewFeePayment, NewFeePlan, PaymentPosting,
};
use crate::context::ActorContext;
use crate::errors::Result;

/// Persistence of fee plans.
#[async_trait]
pub trait FeePlanRepositoryTrait: Send + Sync {
    async fn create(&self, ctx: &ActorContext, draft: FeePlanDraft) -> Result<FeePlan>;

    async fn update(&self, ctx: &ActorContext, plan_id: &str, draft: FeePlanDraft)
        -> Result<FeePlan>;

    /// Deletes a plan. Challans issued from it keep their own copy of the terms.
    async fn delete(&self, academy_no: &str, plan_id: &str) -> Result<usize>;

    fn get_by_id(&self, academy_no: &str, plan_id: &str) -> Result<FeePlan>;

    /// Lists plans, newest first, optionally for one student.
    fn list(&self, academy_no: &str, student_id: Option<&str>) -> Result<Vec<FeePlan>>;

    fn get_by_ids(&self, academy_no: &str, plan_ids: &[String]) -> Result<Vec<FeePlan>>;
}

/// Persistence of fee challans.
#[async_trait]
pub trait FeeChallanRepositoryTrait: Send + Sync {
    /// Inserts all challans in one transaction.
    async fn create_many(
        &self,
        ctx: &ActorContext,
        challans: Vec<NewFeeChallan>,
    ) -> Result<Vec<FeeChallan>>;

    /// Overwrites the editable fields if the challan is still at
    /// `expected_version`.
    async fn update_terms(
        &self,
        ctx: &ActorContext,
        challan_id: &str,
        expected_version: i64,
        edit: ChallanEdit,
    ) -> Result<FeeChallan>;

    async fn set_status(
        &self,
        ctx: &ActorContext,
        challan_id: &str,
        status: ChallanStatus,
    ) -> Result<FeeChallan>;

    /// Deletes a challan, refusing inside the same transaction when payments
    /// exist.
    async fn delete(&self, academy_no: &str, challan_id: &str) -> Result<usize>;

    fn get_by_id(&self, academy_no: &str, challan_id: &str) -> Result<FeeChallan>;

    fn list(&self, academy_no: &str, filter: &ChallanFilter) -> Result<Vec<FeeChallan>>;

    /// Returns the subset of `candidates` already used in this academy.
    fn existing_numbers(&self, academy_no: &str, candidates: &[String])
        -> Result<HashSet<String>>;
}

/// Persistence of fee payments, including the two-table ledger writes.
#[async_trait]
pub trait FeePaymentRepositoryTrait: Send + Sync {
    /// Inserts the payment and applies the settlement to its challan in one
    /// transaction. Fails without writing if the challan version moved.
    async fn record(
        &self,
        ctx: &ActorContext,
        posting: PaymentPosting,
    ) -> Result<(FeeChallan, FeePayment)>;

    /// Deletes the payment and rebuilds its challan from the remaining
    /// payments in one transaction.
    async fn delete(&self, ctx: &ActorContext, payment_id: &str) -> Result<FeeChallan>;

    fn get_by_id(&self, academy_no: &str, payment_id: &str) -> Result<FeePayment>;

    /// Payments of the given challans ordered by payment date.
    fn list_for_challans(&self, academy_no: &str, challan_ids: &[String])
        -> Result<Vec<FeePayment>>;

    fn count_for_challan(&self, academy_no: &str, challan_id: &str) -> Result<usize>;
}

/// Fee plan, challan and payment operations.
#[async_trait]
pub trait FeeServiceTrait: Send + Sync {
    // Plans
    async fn create_plan(&self, ctx: &ActorContext, new_plan: NewFeePlan) -> Result<FeePlan>;
    async fn update_plan(&self, ctx: &ActorContext, update: FeePlanUpdate) -> Result<FeePlan>;
    async fn delete_plan(&self, ctx: &ActorContext, plan_id: &str) -> Result<()>;
    fn get_plan(&self, ctx: &ActorContext, plan_id: &str) -> Result<FeePlan>;
    fn list_plans(&self, ctx: &ActorContext, student_id: Option<&str>) -> Result<Vec<FeePlan>>;
    /// Plans whose student and program are both active.
    fn list_billable_plans(&self, ctx: &ActorContext) -> Result<Vec<FeePlan>>;
    fn calculate_discount(&self, calc: DiscountCalculation) -> Result<DiscountTerms>;

    // Challans
    async fn generate_challans(
        &self,
        ctx: &ActorContext,
        request: GenerateChallansRequest,
    ) -> Result<Vec<FeeChallan>>;
    async fn update_challan(&self, ctx: &ActorContext, update: ChallanUpdate)
        -> Result<FeeChallan>;
    async fn set_challan_status(
        &self,
        ctx: &ActorContext,
        challan_id: &str,
        status: ChallanStatus,
    ) -> Result<FeeChallan>;
    async fn delete_challan(&self, ctx: &ActorContext, challan_id: &str) -> Result<()>;
    fn get_challan(&self, ctx: &ActorContext, challan_id: &str) -> Result<FeeChallan>;
    fn list_challans(&self, ctx: &ActorContext, filter: &ChallanFilter)
        -> Result<Vec<FeeChallan>>;
    fn list_challan_views(
        &self,
        ctx: &ActorContext,
        filter: &ChallanFilter,
    ) -> Result<Vec<ChallanView>>;

    // Payments
    async fn record_payment(
        &self,
        ctx: &ActorContext,
        payment: NewFeePayment,
    ) -> Result<(FeeChallan, FeePayment)>;
    async fn delete_payment(&self, ctx: &ActorContext, payment_id: &str) -> Result<FeeChallan>;
    fn list_payments(&self, ctx: &ActorContext, challan_ids: &[String])
        -> Result<Vec<FeePayment>>;

    /// Outstanding and collected totals across a student's challans.
    fn fee_summary(&self, ctx: &ActorContext, student_id: &str) -> Result<FeeSummary>;
}
