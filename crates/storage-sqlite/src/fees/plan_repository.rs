use academy_core::context::ActorContext;
use academy_core::fees::{FeePlan, FeePlanDraft, FeePlanRepositoryTrait};
use academy_core::Result;

use super::model::{FeePlanChangeset, FeePlanDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{fee_challans, fee_plans};
use crate::utils::chunk_for_sqlite;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

pub struct FeePlanRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl FeePlanRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        FeePlanRepository { pool, writer }
    }
}

#[async_trait]
impl FeePlanRepositoryTrait for FeePlanRepository {
    async fn create(&self, ctx: &ActorContext, draft: FeePlanDraft) -> Result<FeePlan> {
        let row = FeePlanDB::from_draft(
            Uuid::new_v4().to_string(),
            ctx.academy_no.clone(),
            ctx.user_id.clone(),
            draft,
        );

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<FeePlan> {
                let inserted = diesel::insert_into(fee_plans::table)
                    .values(&row)
                    .returning(FeePlanDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(FeePlan::from(inserted))
            })
            .await
    }

    async fn update(&self, ctx: &ActorContext, plan_id: &str, draft: FeePlanDraft) -> Result<FeePlan> {
        let academy_no = ctx.academy_no.clone();
        let plan_id = plan_id.to_string();
        let changes = FeePlanChangeset::from_draft(ctx.user_id.clone(), draft);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<FeePlan> {
                let updated = diesel::update(
                    fee_plans::table
                        .filter(fee_plans::academy_no.eq(&academy_no))
                        .filter(fee_plans::id.eq(&plan_id)),
                )
                .set(&changes)
                .returning(FeePlanDB::as_returning())
                .get_result(conn)
                .map_err(StorageError::from)?;
                Ok(FeePlan::from(updated))
            })
            .await
    }

    async fn delete(&self, academy_no: &str, plan_id: &str) -> Result<usize> {
        let academy_no = academy_no.to_string();
        let plan_id = plan_id.to_string();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                // Issued challans outlive their plan.
                let detached = diesel::update(
                    fee_challans::table
                        .filter(fee_challans::academy_no.eq(&academy_no))
                        .filter(fee_challans::fee_plan_id.eq(&plan_id)),
                )
                .set(fee_challans::fee_plan_id.eq(None::<String>))
                .execute(conn)
                .map_err(StorageError::from)?;
                debug!("Detached {} challan(s) from fee plan {}", detached, plan_id);

                Ok(diesel::delete(
                    fee_plans::table
                        .filter(fee_plans::academy_no.eq(&academy_no))
                        .filter(fee_plans::id.eq(&plan_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }

    fn get_by_id(&self, academy_no: &str, plan_id: &str) -> Result<FeePlan> {
        let mut conn = get_connection(&self.pool)?;
        let row = fee_plans::table
            .filter(fee_plans::academy_no.eq(academy_no))
            .filter(fee_plans::id.eq(plan_id))
            .select(FeePlanDB::as_select())
            .first::<FeePlanDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(FeePlan::from(row))
    }

    fn list(&self, academy_no: &str, student_id: Option<&str>) -> Result<Vec<FeePlan>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = fee_plans::table
            .filter(fee_plans::academy_no.eq(academy_no))
            .into_boxed();
        if let Some(student_id) = student_id {
            query = query.filter(fee_plans::student_id.eq(student_id));
        }
        let rows = query
            .order(fee_plans::created_at.desc())
            .select(FeePlanDB::as_select())
            .load::<FeePlanDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(FeePlan::from).collect())
    }

    fn get_by_ids(&self, academy_no: &str, plan_ids: &[String]) -> Result<Vec<FeePlan>> {
        let mut conn = get_connection(&self.pool)?;
        let mut plans = Vec::with_capacity(plan_ids.len());
        for chunk in chunk_for_sqlite(plan_ids) {
            let rows = fee_plans::table
                .filter(fee_plans::academy_no.eq(academy_no))
                .filter(fee_plans::id.eq_any(chunk))
                .select(FeePlanDB::as_select())
                .load::<FeePlanDB>(&mut conn)
                .map_err(StorageError::from)?;
            plans.extend(rows.into_iter().map(FeePlan::from));
        }
        Ok(plans)
    }
}
