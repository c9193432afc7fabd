use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::{into_domain, FundAllocationDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::fund_allocations;
use crate::utils::new_id;
use fundflow_core::allocations::{
    AllocationRepositoryTrait, AllocationStatus, AllocationWeight, FundAllocation,
    NewFundAllocation,
};
use fundflow_core::errors::ValidationError;
use fundflow_core::utils::time_utils::now_utc;
use fundflow_core::Result;

pub struct AllocationRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AllocationRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn load_one(conn: &mut SqliteConnection, allocation_id: &str) -> Result<FundAllocation> {
    let row = fund_allocations::table
        .find(allocation_id)
        .select(FundAllocationDB::as_select())
        .first::<FundAllocationDB>(conn)
        .into_core()?;
    FundAllocation::try_from(row)
}

#[async_trait]
impl AllocationRepositoryTrait for AllocationRepository {
    async fn get_allocation(&self, allocation_id: &str) -> Result<Option<FundAllocation>> {
        let mut conn = get_connection(&self.pool)?;
        fund_allocations::table
            .find(allocation_id)
            .select(FundAllocationDB::as_select())
            .first::<FundAllocationDB>(&mut conn)
            .optional()
            .into_core()?
            .map(FundAllocation::try_from)
            .transpose()
    }

    async fn get_allocations_by_fund(&self, fund_id: &str) -> Result<Vec<FundAllocation>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = fund_allocations::table
            .filter(fund_allocations::fund_id.eq(fund_id))
            .order((
                fund_allocations::allocation_date.asc(),
                fund_allocations::created_at.asc(),
            ))
            .select(FundAllocationDB::as_select())
            .load::<FundAllocationDB>(&mut conn)
            .into_core()?;
        into_domain(rows)
    }

    async fn find_allocation(
        &self,
        fund_id: &str,
        deal_id: &str,
        allocation_date: NaiveDate,
    ) -> Result<Option<FundAllocation>> {
        let mut conn = get_connection(&self.pool)?;
        fund_allocations::table
            .filter(fund_allocations::fund_id.eq(fund_id))
            .filter(fund_allocations::deal_id.eq(deal_id))
            .filter(fund_allocations::allocation_date.eq(allocation_date))
            .select(FundAllocationDB::as_select())
            .first::<FundAllocationDB>(&mut conn)
            .optional()
            .into_core()?
            .map(FundAllocation::try_from)
            .transpose()
    }

    async fn create_allocation(&self, new_allocation: NewFundAllocation) -> Result<FundAllocation> {
        let allocation_date = new_allocation
            .allocation_date
            .ok_or_else(|| ValidationError::MissingField("allocationDate".to_string()))?;

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<FundAllocation> {
                let now = now_utc();
                let row = FundAllocationDB {
                    id: new_id(),
                    fund_id: new_allocation.fund_id,
                    deal_id: new_allocation.deal_id,
                    amount: new_allocation.amount.to_string(),
                    amount_type: new_allocation.amount_type.as_db_str().to_string(),
                    allocation_date,
                    status: new_allocation
                        .status
                        .unwrap_or_default()
                        .as_db_str()
                        .to_string(),
                    portfolio_weight: "0".to_string(),
                    created_at: now,
                    updated_at: now,
                };
                let created = diesel::insert_into(fund_allocations::table)
                    .values(&row)
                    .returning(FundAllocationDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                FundAllocation::try_from(created)
            })
            .await
    }

    async fn update_allocation_status(
        &self,
        allocation_id: &str,
        status: AllocationStatus,
    ) -> Result<FundAllocation> {
        let allocation_id = allocation_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<FundAllocation> {
                diesel::update(fund_allocations::table.find(&allocation_id))
                    .set((
                        fund_allocations::status.eq(status.as_db_str()),
                        fund_allocations::updated_at.eq(now_utc()),
                    ))
                    .execute(conn)
                    .into_core()?;
                load_one(conn, &allocation_id)
            })
            .await
    }

    async fn update_portfolio_weights(
        &self,
        fund_id: &str,
        weights: Vec<AllocationWeight>,
    ) -> Result<usize> {
        let fund_id = fund_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let now = now_utc();
                let mut written = 0;
                for weight in weights {
                    written += diesel::update(
                        fund_allocations::table
                            .filter(fund_allocations::id.eq(&weight.allocation_id))
                            .filter(fund_allocations::fund_id.eq(&fund_id)),
                    )
                    .set((
                        fund_allocations::portfolio_weight.eq(weight.portfolio_weight.to_string()),
                        fund_allocations::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .into_core()?;
                }
                Ok(written)
            })
            .await
    }
}
