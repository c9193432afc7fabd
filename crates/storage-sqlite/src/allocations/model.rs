//! Database model for fund allocations.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::{parse_decimal, parse_enum};
use fundflow_core::allocations::{AllocationStatus, AmountType, FundAllocation};
use fundflow_core::errors::Error;

#[derive(
    Queryable,
    Selectable,
    Insertable,
    Identifiable,
    AsChangeset,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::fund_allocations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct FundAllocationDB {
    pub id: String,
    pub fund_id: String,
    pub deal_id: String,
    pub amount: String,
    pub amount_type: String,
    pub allocation_date: NaiveDate,
    pub status: String,
    pub portfolio_weight: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<FundAllocationDB> for FundAllocation {
    type Error = Error;

    fn try_from(db: FundAllocationDB) -> Result<Self, Self::Error> {
        Ok(Self {
            amount: parse_decimal("fund_allocations.amount", &db.amount)?,
            amount_type: parse_enum(
                "fund_allocations.amount_type",
                &db.amount_type,
                AmountType::from_db_str,
            )?,
            status: parse_enum(
                "fund_allocations.status",
                &db.status,
                AllocationStatus::from_db_str,
            )?,
            portfolio_weight: parse_decimal(
                "fund_allocations.portfolio_weight",
                &db.portfolio_weight,
            )?,
            id: db.id,
            fund_id: db.fund_id,
            deal_id: db.deal_id,
            allocation_date: db.allocation_date,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

pub(crate) fn into_domain(
    rows: Vec<FundAllocationDB>,
) -> fundflow_core::Result<Vec<FundAllocation>> {
    rows.into_iter().map(FundAllocation::try_from).collect()
}
