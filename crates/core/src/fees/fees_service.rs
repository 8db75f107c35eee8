use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::challan_number;
use super::discount::{DiscountCalculation, DiscountTerms};
use super::fees_constants::{MAX_CHALLAN_NUMBER_ROUNDS, UNKNOWN_DISPLAY_NAME};
use super::fees_errors::FeeError;
use super::fees_model::{
    ChallanEdit, ChallanFilter, ChallanStatus, ChallanUpdate, ChallanView, FeeChallan, FeePayment,
    FeePlan, FeePlanDraft, FeePlanUpdate, FeeSummary, GenerateChallansRequest, NewFeeChallan,
    NewFeePayment, NewFeePlan, PaymentPosting,
};
use super::fees_traits::{
    FeeChallanRepositoryTrait, FeePaymentRepositoryTrait, FeePlanRepositoryTrait, FeeServiceTrait,
};
use super::ledger;
use crate::context::ActorContext;
use crate::directory::{
    ProgramDirectoryTrait, ProgramStatus, StudentDirectoryTrait, StudentStatus,
};
use crate::errors::{Error, Result, ValidationError};

/// Service for fee plans, challans and the payment ledger.
pub struct FeeService {
    plan_repository: Arc<dyn FeePlanRepositoryTrait>,
    challan_repository: Arc<dyn FeeChallanRepositoryTrait>,
    payment_repository: Arc<dyn FeePaymentRepositoryTrait>,
    students: Arc<dyn StudentDirectoryTrait>,
    programs: Arc<dyn ProgramDirectoryTrait>,
}

impl FeeService {
    pub fn new(
        plan_repository: Arc<dyn FeePlanRepositoryTrait>,
        challan_repository: Arc<dyn FeeChallanRepositoryTrait>,
        payment_repository: Arc<dyn FeePaymentRepositoryTrait>,
        students: Arc<dyn StudentDirectoryTrait>,
        programs: Arc<dyn ProgramDirectoryTrait>,
    ) -> Self {
        Self {
            plan_repository,
            challan_repository,
            payment_repository,
            students,
            programs,
        }
    }

    fn load_challan(&self, academy_no: &str, challan_id: &str) -> Result<FeeChallan> {
        with_entity(
            self.challan_repository.get_by_id(academy_no, challan_id),
            "Fee challan",
            challan_id,
        )
    }

    fn load_plan(&self, academy_no: &str, plan_id: &str) -> Result<FeePlan> {
        with_entity(
            self.plan_repository.get_by_id(academy_no, plan_id),
            "Fee plan",
            plan_id,
        )
    }

    /// Picks `count` challan numbers unused in the academy for the month of `on`.
    fn allocate_challan_numbers(
        &self,
        academy_no: &str,
        count: usize,
        on: NaiveDate,
    ) -> Result<Vec<String>> {
        let mut rng = rand::thread_rng();
        let mut taken: HashSet<String> = HashSet::new();
        let mut numbers: Vec<String> = Vec::with_capacity(count);

        for _ in 0..MAX_CHALLAN_NUMBER_ROUNDS {
            let needed = count - numbers.len();
            if needed == 0 {
                break;
            }
            let candidates = challan_number::generate_distinct(&mut rng, on, needed, &taken);
            if candidates.is_empty() {
                break;
            }
            let existing = self
                .challan_repository
                .existing_numbers(academy_no, &candidates)?;
            for candidate in candidates {
                if existing.contains(&candidate) {
                    debug!("Challan number {} already in use, drawing again", candidate);
                } else {
                    numbers.push(candidate.clone());
                }
                taken.insert(candidate);
            }
        }

        if numbers.len() < count {
            return Err(Error::ConstraintViolation(format!(
                "Could not allocate {} unique challan numbers for {}",
                count,
                on.format("%Y-%m")
            )));
        }
        Ok(numbers)
    }

    fn student_name(&self, academy_no: &str, student_id: &str) -> String {
        match self.students.get_student(academy_no, student_id) {
            Ok(student) => student.name,
            Err(e) => {
                warn!("Could not resolve student {}: {}", student_id, e);
                UNKNOWN_DISPLAY_NAME.to_string()
            }
        }
    }

    fn program_name(&self, academy_no: &str, program_id: &str) -> String {
        match self.programs.get_program(academy_no, program_id) {
            Ok(program) => program.name,
            Err(e) => {
                warn!("Could not resolve program {}: {}", program_id, e);
                UNKNOWN_DISPLAY_NAME.to_string()
            }
        }
    }
}

/// Builds a plan draft, rejecting fees and discounts that cannot form a plan.
#[allow(clippy::too_many_arguments)]
fn plan_draft(
    student_id: String,
    program_id: String,
    actual_fee: Decimal,
    discount_amount: Decimal,
    effective_from: NaiveDate,
    discount_type: Option<super::DiscountType>,
    discount_reason: Option<String>,
    notes: Option<String>,
) -> Result<FeePlanDraft> {
    if actual_fee <= Decimal::ZERO {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Program fee amount is required. Please select a program with a fee amount."
                .to_string(),
        )));
    }
    if discount_amount > actual_fee {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Discount amount {} cannot exceed the actual fee {}",
            discount_amount, actual_fee
        ))));
    }

    Ok(FeePlanDraft {
        student_id,
        program_id,
        terms: DiscountTerms::from_discount_amount(actual_fee, discount_amount)?,
        effective_from,
        discount_type,
        discount_reason: non_blank(discount_reason),
        notes: non_blank(notes),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Replaces a storage-level "record not found" with a named ledger error.
fn with_entity<T>(result: Result<T>, entity: &'static str, id: &str) -> Result<T> {
    result.map_err(|e| {
        if e.is_not_found() {
            FeeError::not_found(entity, id).into()
        } else {
            e
        }
    })
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[async_trait]
impl FeeServiceTrait for FeeService {
    async fn create_plan(&self, ctx: &ActorContext, new_plan: NewFeePlan) -> Result<FeePlan> {
        ctx.validate()?;
        new_plan.validate()?;

        let student = with_entity(
            self.students
                .get_student(&ctx.academy_no, &new_plan.student_id),
            "Student",
            &new_plan.student_id,
        )?;
        let program = with_entity(
            self.programs
                .get_program(&ctx.academy_no, &new_plan.program_id),
            "Program",
            &new_plan.program_id,
        )?;

        let actual_fee = new_plan
            .actual_fee
            .or(program.fee_amount)
            .unwrap_or(Decimal::ZERO);
        let draft = plan_draft(
            new_plan.student_id,
            new_plan.program_id,
            actual_fee,
            new_plan.discount_amount,
            new_plan.effective_from,
            new_plan.discount_type,
            new_plan.discount_reason,
            new_plan.notes,
        )?;

        debug!(
            "Creating fee plan for student '{}' in program '{}': fee {} after discount",
            student.name, program.code, draft.terms.fee_after_discount
        );
        self.plan_repository.create(ctx, draft).await
    }

    async fn update_plan(&self, ctx: &ActorContext, update: FeePlanUpdate) -> Result<FeePlan> {
        ctx.validate()?;
        update.validate()?;
        let plan_id = update.id.clone().unwrap_or_default();
        let existing = self.load_plan(&ctx.academy_no, &plan_id)?;

        let draft = plan_draft(
            existing.student_id,
            existing.program_id,
            update.actual_fee,
            update.discount_amount,
            update.effective_from,
            update.discount_type,
            update.discount_reason,
            update.notes,
        )?;
        self.plan_repository.update(ctx, &plan_id, draft).await
    }

    async fn delete_plan(&self, ctx: &ActorContext, plan_id: &str) -> Result<()> {
        ctx.validate()?;
        self.load_plan(&ctx.academy_no, plan_id)?;
        self.plan_repository.delete(&ctx.academy_no, plan_id).await?;
        info!("Deleted fee plan {} in academy {}", plan_id, ctx.academy_no);
        Ok(())
    }

    fn get_plan(&self, ctx: &ActorContext, plan_id: &str) -> Result<FeePlan> {
        ctx.validate()?;
        self.load_plan(&ctx.academy_no, plan_id)
    }

    fn list_plans(&self, ctx: &ActorContext, student_id: Option<&str>) -> Result<Vec<FeePlan>> {
        ctx.validate()?;
        self.plan_repository.list(&ctx.academy_no, student_id)
    }

    fn list_billable_plans(&self, ctx: &ActorContext) -> Result<Vec<FeePlan>> {
        ctx.validate()?;
        let active_students: HashSet<String> = self
            .students
            .list_students(&ctx.academy_no, Some(StudentStatus::Active))?
            .into_iter()
            .map(|s| s.id)
            .collect();
        let active_programs: HashSet<String> = self
            .programs
            .list_programs(&ctx.academy_no, Some(ProgramStatus::Active))?
            .into_iter()
            .map(|p| p.id)
            .collect();

        Ok(self
            .plan_repository
            .list(&ctx.academy_no, None)?
            .into_iter()
            .filter(|plan| {
                active_students.contains(&plan.student_id)
                    && active_programs.contains(&plan.program_id)
            })
            .collect())
    }

    fn calculate_discount(&self, calc: DiscountCalculation) -> Result<DiscountTerms> {
        DiscountTerms::from_calculation(calc)
    }

    async fn generate_challans(
        &self,
        ctx: &ActorContext,
        request: GenerateChallansRequest,
    ) -> Result<Vec<FeeChallan>> {
        ctx.validate()?;
        request.validate()?;

        let mut seen = HashSet::new();
        let plan_ids: Vec<String> = request
            .fee_plan_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        let mut plans_by_id: HashMap<String, FeePlan> = self
            .plan_repository
            .get_by_ids(&ctx.academy_no, &plan_ids)?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let mut plans = Vec::with_capacity(plan_ids.len());
        for plan_id in &plan_ids {
            let plan = plans_by_id
                .remove(plan_id)
                .ok_or_else(|| FeeError::not_found("Fee plan", plan_id.as_str()))?;
            if plan.fee_after_discount <= Decimal::ZERO {
                return Err(FeeError::InvalidChallanAmount {
                    amount: plan.fee_after_discount,
                    paid_amount: Decimal::ZERO,
                }
                .into());
            }
            plans.push(plan);
        }

        let numbers = self.allocate_challan_numbers(&ctx.academy_no, plans.len(), today())?;
        let notes = non_blank(request.notes);
        let new_challans: Vec<NewFeeChallan> = plans
            .into_iter()
            .zip(numbers)
            .map(|(plan, challan_number)| NewFeeChallan {
                fee_plan_id: plan.id,
                student_id: plan.student_id,
                program_id: plan.program_id,
                challan_number,
                issue_date: request.issue_date,
                due_date: request.due_date,
                amount: plan.fee_after_discount,
                notes: notes.clone(),
            })
            .collect();

        let created = self.challan_repository.create_many(ctx, new_challans).await?;
        info!(
            "Generated {} challan(s) in academy {}",
            created.len(),
            ctx.academy_no
        );
        Ok(created)
    }

    async fn update_challan(
        &self,
        ctx: &ActorContext,
        update: ChallanUpdate,
    ) -> Result<FeeChallan> {
        ctx.validate()?;
        update.validate()?;
        let challan_id = update.id.clone().unwrap_or_default();
        let challan = self.load_challan(&ctx.academy_no, &challan_id)?;

        let expected_version = update.expected_version.unwrap_or(challan.version);
        if expected_version != challan.version {
            return Err(FeeError::ConcurrentModification { challan_id }.into());
        }
        let status = ledger::status_after_amount_change(&challan, update.amount)?;

        let edit = ChallanEdit {
            issue_date: update.issue_date,
            due_date: update.due_date,
            amount: update.amount,
            status,
            notes: non_blank(update.notes),
        };
        self.challan_repository
            .update_terms(ctx, &challan_id, expected_version, edit)
            .await
    }

    async fn set_challan_status(
        &self,
        ctx: &ActorContext,
        challan_id: &str,
        status: ChallanStatus,
    ) -> Result<FeeChallan> {
        ctx.validate()?;
        ledger::ensure_manual_status(status)?;
        self.load_challan(&ctx.academy_no, challan_id)?;
        self.challan_repository
            .set_status(ctx, challan_id, status)
            .await
    }

    async fn delete_challan(&self, ctx: &ActorContext, challan_id: &str) -> Result<()> {
        ctx.validate()?;
        let challan = self.load_challan(&ctx.academy_no, challan_id)?;
        let payment_count = self
            .payment_repository
            .count_for_challan(&ctx.academy_no, challan_id)?;
        ledger::ensure_deletable(&challan, payment_count)?;

        self.challan_repository
            .delete(&ctx.academy_no, challan_id)
            .await?;
        info!(
            "Deleted challan {} in academy {}",
            challan.challan_number, ctx.academy_no
        );
        Ok(())
    }

    fn get_challan(&self, ctx: &ActorContext, challan_id: &str) -> Result<FeeChallan> {
        ctx.validate()?;
        self.load_challan(&ctx.academy_no, challan_id)
    }

    fn list_challans(
        &self,
        ctx: &ActorContext,
        filter: &ChallanFilter,
    ) -> Result<Vec<FeeChallan>> {
        ctx.validate()?;
        self.challan_repository.list(&ctx.academy_no, filter)
    }

    fn list_challan_views(
        &self,
        ctx: &ActorContext,
        filter: &ChallanFilter,
    ) -> Result<Vec<ChallanView>> {
        let challans = self.list_challans(ctx, filter)?;

        let mut student_names: HashMap<String, String> = HashMap::new();
        let mut program_names: HashMap<String, String> = HashMap::new();
        Ok(challans
            .into_iter()
            .map(|challan| {
                let student_name = student_names
                    .entry(challan.student_id.clone())
                    .or_insert_with(|| self.student_name(&ctx.academy_no, &challan.student_id))
                    .clone();
                let program_name = program_names
                    .entry(challan.program_id.clone())
                    .or_insert_with(|| self.program_name(&ctx.academy_no, &challan.program_id))
                    .clone();
                ChallanView {
                    challan,
                    student_name,
                    program_name,
                }
            })
            .collect())
    }

    async fn record_payment(
        &self,
        ctx: &ActorContext,
        payment: NewFeePayment,
    ) -> Result<(FeeChallan, FeePayment)> {
        ctx.validate()?;
        let challan = self.load_challan(&ctx.academy_no, &payment.challan_id)?;
        let settlement = ledger::apply_payment(&challan, &payment)?;

        debug!(
            "Recording payment of {} on challan {} (paid {} -> {})",
            payment.amount, challan.challan_number, challan.paid_amount, settlement.paid_amount
        );
        let posting = PaymentPosting {
            challan_id: challan.id.clone(),
            student_id: challan.student_id.clone(),
            expected_version: challan.version,
            settlement,
            payment,
        };
        let (updated, recorded) = self.payment_repository.record(ctx, posting).await?;
        info!(
            "Challan {} is now {} ({} of {})",
            updated.challan_number, updated.status, updated.paid_amount, updated.amount
        );
        Ok((updated, recorded))
    }

    async fn delete_payment(&self, ctx: &ActorContext, payment_id: &str) -> Result<FeeChallan> {
        ctx.validate()?;
        with_entity(
            self.payment_repository
                .get_by_id(&ctx.academy_no, payment_id),
            "Fee payment",
            payment_id,
        )?;

        let challan = self.payment_repository.delete(ctx, payment_id).await?;
        info!(
            "Deleted payment {}; challan {} is now {} ({} of {})",
            payment_id, challan.challan_number, challan.status, challan.paid_amount, challan.amount
        );
        Ok(challan)
    }

    fn list_payments(
        &self,
        ctx: &ActorContext,
        challan_ids: &[String],
    ) -> Result<Vec<FeePayment>> {
        ctx.validate()?;
        if challan_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.payment_repository
            .list_for_challans(&ctx.academy_no, challan_ids)
    }

    fn fee_summary(&self, ctx: &ActorContext, student_id: &str) -> Result<FeeSummary> {
        let challans = self.list_challans(ctx, &ChallanFilter::for_student(student_id))?;

        let outstanding: Vec<&FeeChallan> = challans
            .iter()
            .filter(|c| c.status.is_outstanding())
            .collect();
        let total_pending: Decimal = outstanding.iter().map(|c| c.amount - c.paid_amount).sum();
        let total_paid: Decimal = challans.iter().map(|c| c.paid_amount).sum();

        Ok(FeeSummary {
            student_id: student_id.to_string(),
            total_pending,
            total_paid,
            total: total_pending + total_paid,
            outstanding_challans: outstanding.len(),
            paid_challans: challans.iter().filter(|c| c.is_fully_paid()).count(),
        })
    }
}
