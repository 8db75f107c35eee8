use academy_core::context::ActorContext;
use academy_core::errors::Error;
use academy_core::fees::{
    ChallanEdit, ChallanFilter, ChallanStatus, FeeChallan, FeeChallanRepositoryTrait, FeeError,
    NewFeeChallan,
};
use academy_core::Result;

use super::model::{ChallanEditChangeset, FeeChallanDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{fee_challans, fee_payments};
use crate::utils::chunk_for_sqlite;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

pub struct FeeChallanRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl FeeChallanRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        FeeChallanRepository { pool, writer }
    }
}

/// Loads a challan row inside the caller's connection or transaction.
pub(super) fn load_challan(
    conn: &mut SqliteConnection,
    academy_no: &str,
    challan_id: &str,
) -> Result<FeeChallanDB> {
    Ok(fee_challans::table
        .filter(fee_challans::academy_no.eq(academy_no))
        .filter(fee_challans::id.eq(challan_id))
        .select(FeeChallanDB::as_select())
        .first::<FeeChallanDB>(conn)
        .map_err(StorageError::from)?)
}

/// Explains why a version-guarded update touched no rows.
pub(super) fn stale_write_error(
    conn: &mut SqliteConnection,
    academy_no: &str,
    challan_id: &str,
) -> Error {
    match load_challan(conn, academy_no, challan_id) {
        Ok(_) => FeeError::ConcurrentModification {
            challan_id: challan_id.to_string(),
        }
        .into(),
        Err(e) => e,
    }
}

#[async_trait]
impl FeeChallanRepositoryTrait for FeeChallanRepository {
    async fn create_many(
        &self,
        ctx: &ActorContext,
        challans: Vec<NewFeeChallan>,
    ) -> Result<Vec<FeeChallan>> {
        let now = chrono::Utc::now().naive_utc();
        let rows: Vec<FeeChallanDB> = challans
            .into_iter()
            .map(|c| FeeChallanDB {
                id: Uuid::new_v4().to_string(),
                academy_no: ctx.academy_no.clone(),
                fee_plan_id: Some(c.fee_plan_id),
                student_id: c.student_id,
                program_id: c.program_id,
                challan_number: c.challan_number,
                issue_date: c.issue_date,
                due_date: c.due_date,
                amount: c.amount.to_string(),
                paid_amount: "0".to_string(),
                status: ChallanStatus::Pending.as_str().to_string(),
                payment_date: None,
                payment_method: None,
                payment_reference: None,
                notes: c.notes,
                version: 1,
                created_by: ctx.user_id.clone(),
                updated_by: ctx.user_id.clone(),
                created_at: now,
                updated_at: now,
            })
            .collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Vec<FeeChallan>> {
                let mut created = Vec::with_capacity(rows.len());
                for row in rows {
                    let inserted = diesel::insert_into(fee_challans::table)
                        .values(&row)
                        .returning(FeeChallanDB::as_returning())
                        .get_result(conn)
                        .map_err(StorageError::from)?;
                    created.push(FeeChallan::from(inserted));
                }
                Ok(created)
            })
            .await
    }

    async fn update_terms(
        &self,
        ctx: &ActorContext,
        challan_id: &str,
        expected_version: i64,
        edit: ChallanEdit,
    ) -> Result<FeeChallan> {
        let academy_no = ctx.academy_no.clone();
        let challan_id = challan_id.to_string();
        let changes = ChallanEditChangeset::new(ctx.user_id.clone(), edit);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<FeeChallan> {
                let updated = diesel::update(
                    fee_challans::table
                        .filter(fee_challans::academy_no.eq(&academy_no))
                        .filter(fee_challans::id.eq(&challan_id))
                        .filter(fee_challans::version.eq(expected_version)),
                )
                .set((&changes, fee_challans::version.eq(fee_challans::version + 1)))
                .execute(conn)
                .map_err(StorageError::from)?;
                if updated == 0 {
                    return Err(stale_write_error(conn, &academy_no, &challan_id));
                }
                Ok(FeeChallan::from(load_challan(conn, &academy_no, &challan_id)?))
            })
            .await
    }

    async fn set_status(
        &self,
        ctx: &ActorContext,
        challan_id: &str,
        status: ChallanStatus,
    ) -> Result<FeeChallan> {
        let academy_no = ctx.academy_no.clone();
        let challan_id = challan_id.to_string();
        let user_id = ctx.user_id.clone();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<FeeChallan> {
                let updated = diesel::update(
                    fee_challans::table
                        .filter(fee_challans::academy_no.eq(&academy_no))
                        .filter(fee_challans::id.eq(&challan_id)),
                )
                .set((
                    fee_challans::status.eq(status.as_str()),
                    fee_challans::version.eq(fee_challans::version + 1),
                    fee_challans::updated_by.eq(user_id),
                    fee_challans::updated_at.eq(chrono::Utc::now().naive_utc()),
                ))
                .returning(FeeChallanDB::as_returning())
                .get_result(conn)
                .map_err(StorageError::from)?;
                Ok(FeeChallan::from(updated))
            })
            .await
    }

    async fn delete(&self, academy_no: &str, challan_id: &str) -> Result<usize> {
        let academy_no = academy_no.to_string();
        let challan_id = challan_id.to_string();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let payment_count: i64 = fee_payments::table
                    .filter(fee_payments::academy_no.eq(&academy_no))
                    .filter(fee_payments::challan_id.eq(&challan_id))
                    .count()
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                if payment_count > 0 {
                    let challan = load_challan(conn, &academy_no, &challan_id)?;
                    return Err(FeeError::ChallanHasPayments {
                        challan_number: challan.challan_number,
                        payment_count: payment_count as usize,
                    }
                    .into());
                }

                Ok(diesel::delete(
                    fee_challans::table
                        .filter(fee_challans::academy_no.eq(&academy_no))
                        .filter(fee_challans::id.eq(&challan_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }

    fn get_by_id(&self, academy_no: &str, challan_id: &str) -> Result<FeeChallan> {
        let mut conn = get_connection(&self.pool)?;
        Ok(FeeChallan::from(load_challan(&mut conn, academy_no, challan_id)?))
    }

    fn list(&self, academy_no: &str, filter: &ChallanFilter) -> Result<Vec<FeeChallan>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = fee_challans::table
            .filter(fee_challans::academy_no.eq(academy_no))
            .into_boxed();
        if let Some(student_id) = &filter.student_id {
            query = query.filter(fee_challans::student_id.eq(student_id));
        }
        if let Some(program_id) = &filter.program_id {
            query = query.filter(fee_challans::program_id.eq(program_id));
        }
        if let Some(statuses) = &filter.statuses {
            let statuses: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
            query = query.filter(fee_challans::status.eq_any(statuses));
        }

        let rows = query
            .order((
                fee_challans::issue_date.desc(),
                fee_challans::created_at.desc(),
            ))
            .select(FeeChallanDB::as_select())
            .load::<FeeChallanDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(FeeChallan::from).collect())
    }

    fn existing_numbers(&self, academy_no: &str, candidates: &[String]) -> Result<HashSet<String>> {
        let mut conn = get_connection(&self.pool)?;
        let mut existing = HashSet::new();
        for chunk in chunk_for_sqlite(candidates) {
            let numbers = fee_challans::table
                .filter(fee_challans::academy_no.eq(academy_no))
                .filter(fee_challans::challan_number.eq_any(chunk))
                .select(fee_challans::challan_number)
                .load::<String>(&mut conn)
                .map_err(StorageError::from)?;
            existing.extend(numbers);
        }
        Ok(existing)
    }
}
