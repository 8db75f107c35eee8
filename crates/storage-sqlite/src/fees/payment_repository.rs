use academy_core::context::ActorContext;
use academy_core::fees::{
    ledger, FeeChallan, FeePayment, FeePaymentRepositoryTrait, PaymentPosting,
};
use academy_core::Result;

use super::challan_repository::{load_challan, stale_write_error};
use super::model::{FeeChallanDB, FeePaymentDB, SettlementChangeset};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{fee_challans, fee_payments};
use crate::utils::chunk_for_sqlite;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

pub struct FeePaymentRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl FeePaymentRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        FeePaymentRepository { pool, writer }
    }
}

fn load_payment(
    conn: &mut SqliteConnection,
    academy_no: &str,
    payment_id: &str,
) -> Result<FeePaymentDB> {
    Ok(fee_payments::table
        .filter(fee_payments::academy_no.eq(academy_no))
        .filter(fee_payments::id.eq(payment_id))
        .select(FeePaymentDB::as_select())
        .first::<FeePaymentDB>(conn)
        .map_err(StorageError::from)?)
}

#[async_trait]
impl FeePaymentRepositoryTrait for FeePaymentRepository {
    async fn record(
        &self,
        ctx: &ActorContext,
        posting: PaymentPosting,
    ) -> Result<(FeeChallan, FeePayment)> {
        let academy_no = ctx.academy_no.clone();
        let challan_id = posting.challan_id.clone();
        let expected_version = posting.expected_version;
        let changes = SettlementChangeset::new(ctx.user_id.clone(), posting.settlement);

        let now = chrono::Utc::now().naive_utc();
        let payment = posting.payment;
        let row = FeePaymentDB {
            id: Uuid::new_v4().to_string(),
            academy_no: ctx.academy_no.clone(),
            challan_id: posting.challan_id,
            student_id: posting.student_id,
            amount: payment.amount.to_string(),
            payment_date: payment.payment_date,
            payment_method: payment.payment_method.map(|m| m.as_str().to_string()),
            payment_reference: payment.payment_reference,
            notes: payment.notes,
            created_by: ctx.user_id.clone(),
            updated_by: ctx.user_id.clone(),
            created_at: now,
            updated_at: now,
        };

        self.writer
            .exec(
                move |conn: &mut SqliteConnection| -> Result<(FeeChallan, FeePayment)> {
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

                    let inserted = diesel::insert_into(fee_payments::table)
                        .values(&row)
                        .returning(FeePaymentDB::as_returning())
                        .get_result(conn)
                        .map_err(StorageError::from)?;
                    let challan = load_challan(conn, &academy_no, &challan_id)?;
                    Ok((FeeChallan::from(challan), FeePayment::from(inserted)))
                },
            )
            .await
    }

    async fn delete(&self, ctx: &ActorContext, payment_id: &str) -> Result<FeeChallan> {
        let academy_no = ctx.academy_no.clone();
        let payment_id = payment_id.to_string();
        let user_id = ctx.user_id.clone();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<FeeChallan> {
                let payment = load_payment(conn, &academy_no, &payment_id)?;
                diesel::delete(fee_payments::table.filter(fee_payments::id.eq(&payment.id)))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let remaining: Vec<FeePayment> = fee_payments::table
                    .filter(fee_payments::academy_no.eq(&academy_no))
                    .filter(fee_payments::challan_id.eq(&payment.challan_id))
                    .select(FeePaymentDB::as_select())
                    .load::<FeePaymentDB>(conn)
                    .map_err(StorageError::from)?
                    .into_iter()
                    .map(FeePayment::from)
                    .collect();

                let challan =
                    FeeChallan::from(load_challan(conn, &academy_no, &payment.challan_id)?);
                let settlement = ledger::settle_from_payments(&challan, &remaining);
                debug!(
                    "Rebuilt challan {} from {} remaining payment(s): paid {}",
                    challan.challan_number,
                    remaining.len(),
                    settlement.paid_amount
                );

                let changes = SettlementChangeset::new(user_id, settlement);
                let updated = diesel::update(
                    fee_challans::table
                        .filter(fee_challans::academy_no.eq(&academy_no))
                        .filter(fee_challans::id.eq(&challan.id)),
                )
                .set((&changes, fee_challans::version.eq(fee_challans::version + 1)))
                .returning(FeeChallanDB::as_returning())
                .get_result(conn)
                .map_err(StorageError::from)?;
                Ok(FeeChallan::from(updated))
            })
            .await
    }

    fn get_by_id(&self, academy_no: &str, payment_id: &str) -> Result<FeePayment> {
        let mut conn = get_connection(&self.pool)?;
        Ok(FeePayment::from(load_payment(&mut conn, academy_no, payment_id)?))
    }

    fn list_for_challans(&self, academy_no: &str, challan_ids: &[String]) -> Result<Vec<FeePayment>> {
        let mut conn = get_connection(&self.pool)?;
        let mut payments = Vec::new();
        for chunk in chunk_for_sqlite(challan_ids) {
            let rows = fee_payments::table
                .filter(fee_payments::academy_no.eq(academy_no))
                .filter(fee_payments::challan_id.eq_any(chunk))
                .select(FeePaymentDB::as_select())
                .load::<FeePaymentDB>(&mut conn)
                .map_err(StorageError::from)?;
            payments.extend(rows.into_iter().map(FeePayment::from));
        }
        payments.sort_by(|a, b| {
            (a.payment_date, a.created_at).cmp(&(b.payment_date, b.created_at))
        });
        Ok(payments)
    }

    fn count_for_challan(&self, academy_no: &str, challan_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let count: i64 = fee_payments::table
            .filter(fee_payments::academy_no.eq(academy_no))
            .filter(fee_payments::challan_id.eq(challan_id))
            .count()
            .get_result(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count as usize)
    }
}
