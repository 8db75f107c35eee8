use std::{sync::Arc, time::Duration};

use academy_core::directory::{Program, ProgramStatus, Student, StudentStatus};
use academy_server::{api::app_router, build_state, config::Config, AppState};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

const ACADEMY: &str = "ACD-3";

struct TestApp {
    router: Router,
    _tmp: TempDir,
}

async fn seed(state: &Arc<AppState>) {
    state
        .directory
        .insert_student(Student {
            id: "stu-1".to_string(),
            academy_no: ACADEMY.to_string(),
            name: "Sana Iqbal".to_string(),
            status: StudentStatus::Active,
        })
        .await
        .unwrap();
    state
        .directory
        .insert_program(Program {
            id: "prog-1".to_string(),
            academy_no: ACADEMY.to_string(),
            code: "PHY-O".to_string(),
            name: "Physics O-Level".to_string(),
            fee_amount: Some(Decimal::from(5000)),
            status: ProgramStatus::Active,
        })
        .await
        .unwrap();
}

async fn test_app() -> TestApp {
    let tmp = tempdir().unwrap();
    let config = Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: tmp.path().join("fees.db").to_string_lossy().to_string(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(30),
    };
    let state = build_state(&config).await.unwrap();
    seed(&state).await;
    TestApp {
        router: app_router(state, &config),
        _tmp: tmp,
    }
}

async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Academy-No", ACADEMY)
        .header("X-User-Id", "cashier-1");
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn issue_challan(app: &TestApp) -> Value {
    let (status, plan) = send(
        app,
        Method::POST,
        "/api/v1/fee-plans",
        Some(json!({
            "studentId": "stu-1",
            "programId": "prog-1",
            "discountAmount": 500,
            "effectiveFrom": "2026-01-01",
            "discountType": "Merit"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(plan["feeAfterDiscount"].as_f64(), Some(4500.0));
    assert_eq!(plan["discountPercent"].as_f64(), Some(10.0));

    let (status, challans) = send(
        app,
        Method::POST,
        "/api/v1/fee-challans/generate",
        Some(json!({
            "feePlanIds": [plan["id"]],
            "issueDate": "2026-05-01",
            "dueDate": "2026-05-10"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let challans = challans.as_array().unwrap();
    assert_eq!(challans.len(), 1);
    challans[0].clone()
}

#[tokio::test]
async fn missing_tenant_header_is_rejected() {
    let app = test_app().await;
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/fee-plans")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], 400);
    assert!(json["message"].as_str().unwrap().contains("X-Academy-No"));
}

#[tokio::test]
async fn payment_lifecycle_over_http() {
    let app = test_app().await;
    let challan = issue_challan(&app).await;
    let challan_id = challan["id"].as_str().unwrap().to_string();
    assert_eq!(challan["status"], "pending");
    assert_eq!(challan["amount"].as_f64(), Some(4500.0));
    assert!(challan["challanNumber"].as_str().unwrap().starts_with("CH-"));

    let payments_uri = format!("/api/v1/fee-challans/{challan_id}/payments");
    let (status, receipt) = send(
        &app,
        Method::POST,
        &payments_uri,
        Some(json!({
            "amount": 2000,
            "paymentDate": "2026-05-05",
            "paymentMethod": "cash"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt["challan"]["status"], "partially_paid");
    assert_eq!(receipt["challan"]["paidAmount"].as_f64(), Some(2000.0));
    assert_eq!(receipt["payment"]["createdBy"], "cashier-1");

    let (status, error) = send(
        &app,
        Method::POST,
        &payments_uri,
        Some(json!({ "amount": 3000, "paymentDate": "2026-05-06" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], 400);
    assert!(error["message"].as_str().unwrap().contains("Maximum"));

    let (status, _) = send(
        &app,
        Method::POST,
        &payments_uri,
        Some(json!({ "amount": 7.9e28, "paymentDate": "2026-05-06" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, summary) =
        send(&app, Method::GET, "/api/v1/students/stu-1/fee-summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totalPending"].as_f64(), Some(2500.0));
    assert_eq!(summary["totalPaid"].as_f64(), Some(2000.0));

    let challan_uri = format!("/api/v1/fee-challans/{challan_id}");
    let (status, _) = send(&app, Method::DELETE, &challan_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, payments) = send(&app, Method::GET, &payments_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let payment_id = payments[0]["id"].as_str().unwrap().to_string();

    let (status, reverted) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/fee-payments/{payment_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reverted["status"], "pending");
    assert_eq!(reverted["paidAmount"].as_f64(), Some(0.0));

    let (status, _) = send(&app, Method::DELETE, &challan_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, error) = send(&app, Method::GET, &challan_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], 404);
}

#[tokio::test]
async fn challan_edits_and_status_changes() {
    let app = test_app().await;
    let challan = issue_challan(&app).await;
    let challan_uri = format!("/api/v1/fee-challans/{}", challan["id"].as_str().unwrap());

    let (status, _) = send(
        &app,
        Method::PUT,
        &challan_uri,
        Some(json!({
            "issueDate": "2026-05-01",
            "dueDate": "2026-05-15",
            "amount": 4000,
            "expectedVersion": 99
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, edited) = send(
        &app,
        Method::PUT,
        &challan_uri,
        Some(json!({
            "issueDate": "2026-05-01",
            "dueDate": "2026-05-15",
            "amount": 4000,
            "notes": "Sibling concession",
            "expectedVersion": challan["version"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["amount"].as_f64(), Some(4000.0));
    assert_eq!(edited["dueDate"], "2026-05-15");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("{challan_uri}/status"),
        Some(json!({ "status": "paid" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, overdue) = send(
        &app,
        Method::PUT,
        &format!("{challan_uri}/status"),
        Some(json!({ "status": "overdue" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overdue["status"], "overdue");

    let (status, listed) = send(
        &app,
        Method::GET,
        "/api/v1/fee-challans?studentId=stu-1&status=overdue,pending",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, views) = send(&app, Method::GET, "/api/v1/fee-challans/views", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(views[0]["studentName"], "Sana Iqbal");
    assert_eq!(views[0]["programName"], "Physics O-Level");

    let (status, _) = send(&app, Method::GET, "/api/v1/fee-challans?status=settled", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, unfiltered) =
        send(&app, Method::GET, "/api/v1/fee-challans?status=,", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unfiltered.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn discount_calculator_and_directory_lists() {
    let app = test_app().await;

    let (status, terms) = send(
        &app,
        Method::POST,
        "/api/v1/fee-plans/discount",
        Some(json!({ "actualFee": 5000, "field": "discountPercent", "value": 15 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(terms["discountAmount"].as_f64(), Some(750.0));
    assert_eq!(terms["feeAfterDiscount"].as_f64(), Some(4250.0));

    let (status, error) = send(
        &app,
        Method::POST,
        "/api/v1/fee-plans/discount",
        Some(json!({ "actualFee": 7e28, "field": "discountPercent", "value": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["message"].as_str().unwrap().contains("out of range"));

    let (status, students) = send(&app, Method::GET, "/api/v1/students?status=active", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(students.as_array().unwrap().len(), 1);

    let (status, programs) = send(&app, Method::GET, "/api/v1/programs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(programs[0]["code"], "PHY-O");

    let (status, billable) = send(&app, Method::GET, "/api/v1/fee-plans/billable", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(billable.as_array().unwrap().is_empty());
}
