use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::PaymentDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::capital_call_payments;
use crate::utils::new_id;
use fundflow_core::payments::{NewPayment, Payment, PaymentRepositoryTrait};
use fundflow_core::utils::time_utils::now_utc;
use fundflow_core::Result;

pub struct PaymentRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PaymentRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl PaymentRepositoryTrait for PaymentRepository {
    async fn get_payments_by_capital_call(&self, capital_call_id: &str) -> Result<Vec<Payment>> {
        let mut conn = get_connection(&self.pool)?;
        capital_call_payments::table
            .filter(capital_call_payments::capital_call_id.eq(capital_call_id))
            .order((
                capital_call_payments::payment_date.asc(),
                capital_call_payments::created_at.asc(),
                capital_call_payments::id.asc(),
            ))
            .select(PaymentDB::as_select())
            .load::<PaymentDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(Payment::try_from)
            .collect()
    }

    async fn create_payment(&self, new_payment: NewPayment) -> Result<Payment> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Payment> {
                let row = PaymentDB {
                    id: new_id(),
                    capital_call_id: new_payment.capital_call_id,
                    amount: new_payment.amount.to_string(),
                    payment_date: new_payment.payment_date,
                    payment_type: new_payment.payment_type.as_db_str().to_string(),
                    notes: new_payment.notes,
                    created_by: new_payment.created_by,
                    created_at: now_utc(),
                };
                let created = diesel::insert_into(capital_call_payments::table)
                    .values(&row)
                    .returning(PaymentDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                Payment::try_from(created)
            })
            .await
    }
}
