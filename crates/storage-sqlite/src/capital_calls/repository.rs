use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::{into_domain, CapitalCallDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::capital_calls;
use crate::utils::new_id;
use fundflow_core::capital_calls::{
    CapitalCall, CapitalCallRepositoryTrait, CapitalCallStatus, NewCapitalCall,
};
use fundflow_core::utils::time_utils::now_utc;
use fundflow_core::Result;

/// Statuses the overdue sweep may pick up.
const OPEN_STATUSES: [CapitalCallStatus; 4] = [
    CapitalCallStatus::Scheduled,
    CapitalCallStatus::Called,
    CapitalCallStatus::Partial,
    CapitalCallStatus::PartiallyPaid,
];

pub struct CapitalCallRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CapitalCallRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl CapitalCallRepositoryTrait for CapitalCallRepository {
    async fn get_capital_call(&self, capital_call_id: &str) -> Result<Option<CapitalCall>> {
        let mut conn = get_connection(&self.pool)?;
        capital_calls::table
            .find(capital_call_id)
            .select(CapitalCallDB::as_select())
            .first::<CapitalCallDB>(&mut conn)
            .optional()
            .into_core()?
            .map(CapitalCall::try_from)
            .transpose()
    }

    async fn get_capital_calls_by_allocation(
        &self,
        allocation_id: &str,
    ) -> Result<Vec<CapitalCall>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = capital_calls::table
            .filter(capital_calls::allocation_id.eq(allocation_id))
            .order(capital_calls::call_date.asc())
            .select(CapitalCallDB::as_select())
            .load::<CapitalCallDB>(&mut conn)
            .into_core()?;
        into_domain(rows)
    }

    async fn find_capital_call(
        &self,
        allocation_id: &str,
        call_date: NaiveDate,
    ) -> Result<Option<CapitalCall>> {
        let mut conn = get_connection(&self.pool)?;
        capital_calls::table
            .filter(capital_calls::allocation_id.eq(allocation_id))
            .filter(capital_calls::call_date.eq(call_date))
            .select(CapitalCallDB::as_select())
            .first::<CapitalCallDB>(&mut conn)
            .optional()
            .into_core()?
            .map(CapitalCall::try_from)
            .transpose()
    }

    async fn create_capital_call(&self, new_call: NewCapitalCall) -> Result<CapitalCall> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<CapitalCall> {
                let now = now_utc();
                let outstanding_amount = new_call.outstanding_amount();
                let row = CapitalCallDB {
                    id: new_id(),
                    allocation_id: new_call.allocation_id,
                    call_amount: new_call.call_amount.to_string(),
                    amount_type: new_call.amount_type.as_db_str().to_string(),
                    call_date: new_call.call_date,
                    due_date: new_call.due_date,
                    status: new_call.status.as_db_str().to_string(),
                    paid_amount: new_call.paid_amount.to_string(),
                    outstanding_amount: outstanding_amount.to_string(),
                    paid_date: new_call.paid_date,
                    notes: new_call.notes,
                    created_at: now,
                    updated_at: now,
                };
                let created = diesel::insert_into(capital_calls::table)
                    .values(&row)
                    .returning(CapitalCallDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                CapitalCall::try_from(created)
            })
            .await
    }

    async fn update_capital_call(&self, call: CapitalCall) -> Result<CapitalCall> {
        let row = CapitalCallDB::from(call);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<CapitalCall> {
                let updated = diesel::update(capital_calls::table.find(&row.id))
                    .set(&row)
                    .returning(CapitalCallDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                CapitalCall::try_from(updated)
            })
            .await
    }

    async fn get_open_capital_calls_due_before(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<CapitalCall>> {
        let mut conn = get_connection(&self.pool)?;
        let open: Vec<&str> = OPEN_STATUSES.iter().map(|s| s.as_db_str()).collect();
        let rows = capital_calls::table
            .filter(capital_calls::due_date.lt(date))
            .filter(capital_calls::status.eq_any(open))
            .order((capital_calls::due_date.asc(), capital_calls::call_date.asc()))
            .select(CapitalCallDB::as_select())
            .load::<CapitalCallDB>(&mut conn)
            .into_core()?;
        into_domain(rows)
    }
}
