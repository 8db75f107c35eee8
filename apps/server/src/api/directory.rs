use std::{str::FromStr, sync::Arc};

use crate::{api::shared::Actor, error::ApiResult, main_lib::AppState, models::DirectoryQuery};
use academy_core::directory::{
    Program, ProgramDirectoryTrait, ProgramStatus, Student, StudentDirectoryTrait, StudentStatus,
};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

async fn list_students(
    State(state): State<Arc<AppState>>,
    Actor(ctx): Actor,
    Query(query): Query<DirectoryQuery>,
) -> ApiResult<Json<Vec<Student>>> {
    ctx.validate()?;
    let status = query
        .status
        .as_deref()
        .map(StudentStatus::from_str)
        .transpose()?;
    let students = state.directory.list_students(&ctx.academy_no, status)?;
    Ok(Json(students))
}

async fn list_programs(
    State(state): State<Arc<AppState>>,
    Actor(ctx): Actor,
    Query(query): Query<DirectoryQuery>,
) -> ApiResult<Json<Vec<Program>>> {
    ctx.validate()?;
    let status = query
        .status
        .as_deref()
        .map(ProgramStatus::from_str)
        .transpose()?;
    let programs = state.directory.list_programs(&ctx.academy_no, status)?;
    Ok(Json(programs))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/students", get(list_students))
        .route("/programs", get(list_programs))
}
