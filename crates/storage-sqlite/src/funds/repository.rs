use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::FundDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::funds;
use crate::utils::new_id;
use fundflow_core::constants::DEFAULT_FUND_CURRENCY;
use fundflow_core::funds::{Fund, FundRepositoryTrait, NewFund};
use fundflow_core::utils::time_utils::now_utc;
use fundflow_core::Result;

pub struct FundRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl FundRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl FundRepositoryTrait for FundRepository {
    async fn get_fund(&self, fund_id: &str) -> Result<Option<Fund>> {
        let mut conn = get_connection(&self.pool)?;
        let fund = funds::table
            .find(fund_id)
            .select(FundDB::as_select())
            .first::<FundDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(fund.map(Fund::from))
    }

    async fn list_funds(&self) -> Result<Vec<Fund>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = funds::table
            .order(funds::name.asc())
            .select(FundDB::as_select())
            .load::<FundDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Fund::from).collect())
    }

    async fn create_fund(&self, new_fund: NewFund) -> Result<Fund> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Fund> {
                let now = now_utc();
                let row = FundDB {
                    id: new_fund.id.unwrap_or_else(new_id),
                    name: new_fund.name,
                    vintage_year: new_fund.vintage_year,
                    currency: new_fund
                        .currency
                        .unwrap_or_else(|| DEFAULT_FUND_CURRENCY.to_string()),
                    created_at: now,
                    updated_at: now,
                };
                let created = diesel::insert_into(funds::table)
                    .values(&row)
                    .returning(FundDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                Ok(Fund::from(created))
            })
            .await
    }
}
