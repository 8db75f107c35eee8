use std::sync::Arc;

use crate::{
    api::shared::{parse_list, Actor},
    error::ApiResult,
    main_lib::AppState,
    models::{ChallanQuery, PaymentInput, PaymentReceipt, PlanQuery, StatusChange},
};
use academy_core::fees::{
    ChallanFilter, ChallanUpdate, ChallanView, DiscountCalculation, DiscountTerms, FeeChallan,
    FeePayment, FeePlan, FeePlanUpdate, FeeSummary, GenerateChallansRequest, NewFeePayment,
    NewFeePlan,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};

fn challan_filter(query: ChallanQuery) -> ApiResult<ChallanFilter> {
    Ok(ChallanFilter {
        statuses: parse_list(query.status.as_deref())?,
        student_id: query.student_id,
        program_id: query.program_id,
    })
}

// ==================== Plans ====================

async fn list_plans(
    State(state): State<Arc<AppState>>,
    Actor(ctx): Actor,
    Query(query): Query<PlanQuery>,
) -> ApiResult<Json<Vec<FeePlan>>> {
    let plans = state
        .fee_service
        .list_plans(&ctx, query.student_id.as_deref())?;
    Ok(Json(plans))
}

async fn list_billable_plans(
    State(state): State<Arc<AppState>>,
    Actor(ctx): Actor,
) -> ApiResult<Json<Vec<FeePlan>>> {
    let plans = state.fee_service.list_billable_plans(&ctx)?;
    Ok(Json(plans))
}

async fn create_plan(
    State(state): State<Arc<AppState>>,
    Actor(ctx): Actor,
    Json(plan): Json<NewFeePlan>,
) -> ApiResult<(StatusCode, Json<FeePlan>)> {
    let plan = state.fee_service.create_plan(&ctx, plan).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn update_plan(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Actor(ctx): Actor,
    Json(mut update): Json<FeePlanUpdate>,
) -> ApiResult<Json<FeePlan>> {
    update.id = Some(id);
    let plan = state.fee_service.update_plan(&ctx, update).await?;
    Ok(Json(plan))
}

async fn delete_plan(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Actor(ctx): Actor,
) -> ApiResult<StatusCode> {
    state.fee_service.delete_plan(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn calculate_discount(
    State(state): State<Arc<AppState>>,
    Json(calc): Json<DiscountCalculation>,
) -> ApiResult<Json<DiscountTerms>> {
    let terms = state.fee_service.calculate_discount(calc)?;
    Ok(Json(terms))
}

// ==================== Challans ====================

async fn list_challans(
    State(state): State<Arc<AppState>>,
    Actor(ctx): Actor,
    Query(query): Query<ChallanQuery>,
) -> ApiResult<Json<Vec<FeeChallan>>> {
    let filter = challan_filter(query)?;
    let challans = state.fee_service.list_challans(&ctx, &filter)?;
    Ok(Json(challans))
}

async fn list_challan_views(
    State(state): State<Arc<AppState>>,
    Actor(ctx): Actor,
    Query(query): Query<ChallanQuery>,
) -> ApiResult<Json<Vec<ChallanView>>> {
    let filter = challan_filter(query)?;
    let views = state.fee_service.list_challan_views(&ctx, &filter)?;
    Ok(Json(views))
}

async fn generate_challans(
    State(state): State<Arc<AppState>>,
    Actor(ctx): Actor,
    Json(request): Json<GenerateChallansRequest>,
) -> ApiResult<(StatusCode, Json<Vec<FeeChallan>>)> {
    let challans = state.fee_service.generate_challans(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(challans)))
}

async fn get_challan(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Actor(ctx): Actor,
) -> ApiResult<Json<FeeChallan>> {
    let challan = state.fee_service.get_challan(&ctx, &id)?;
    Ok(Json(challan))
}

async fn update_challan(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Actor(ctx): Actor,
    Json(mut update): Json<ChallanUpdate>,
) -> ApiResult<Json<FeeChallan>> {
    update.id = Some(id);
    let challan = state.fee_service.update_challan(&ctx, update).await?;
    Ok(Json(challan))
}

async fn set_challan_status(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Actor(ctx): Actor,
    Json(change): Json<StatusChange>,
) -> ApiResult<Json<FeeChallan>> {
    let challan = state
        .fee_service
        .set_challan_status(&ctx, &id, change.status)
        .await?;
    Ok(Json(challan))
}

async fn delete_challan(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Actor(ctx): Actor,
) -> ApiResult<StatusCode> {
    state.fee_service.delete_challan(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ==================== Payments ====================

async fn list_payments(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Actor(ctx): Actor,
) -> ApiResult<Json<Vec<FeePayment>>> {
    let payments = state.fee_service.list_payments(&ctx, &[id])?;
    Ok(Json(payments))
}

async fn record_payment(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Actor(ctx): Actor,
    Json(input): Json<PaymentInput>,
) -> ApiResult<(StatusCode, Json<PaymentReceipt>)> {
    let payment = NewFeePayment {
        challan_id: id,
        amount: input.amount,
        payment_date: input.payment_date,
        payment_method: input.payment_method,
        payment_reference: input.payment_reference,
        notes: input.notes,
    };
    let (challan, payment) = state.fee_service.record_payment(&ctx, payment).await?;
    Ok((StatusCode::CREATED, Json(PaymentReceipt { challan, payment })))
}

async fn delete_payment(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Actor(ctx): Actor,
) -> ApiResult<Json<FeeChallan>> {
    let challan = state.fee_service.delete_payment(&ctx, &id).await?;
    Ok(Json(challan))
}

async fn fee_summary(
    Path(student_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Actor(ctx): Actor,
) -> ApiResult<Json<FeeSummary>> {
    let summary = state.fee_service.fee_summary(&ctx, &student_id)?;
    Ok(Json(summary))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/fee-plans", get(list_plans).post(create_plan))
        .route("/fee-plans/billable", get(list_billable_plans))
        .route("/fee-plans/discount", post(calculate_discount))
        .route("/fee-plans/{id}", put(update_plan).delete(delete_plan))
        .route("/fee-challans", get(list_challans))
        .route("/fee-challans/views", get(list_challan_views))
        .route("/fee-challans/generate", post(generate_challans))
        .route(
            "/fee-challans/{id}",
            get(get_challan).put(update_challan).delete(delete_challan),
        )
        .route("/fee-challans/{id}/status", put(set_challan_status))
        .route(
            "/fee-challans/{id}/payments",
            get(list_payments).post(record_payment),
        )
        .route("/fee-payments/{id}", delete(delete_payment))
        .route("/students/{id}/fee-summary", get(fee_summary))
}
