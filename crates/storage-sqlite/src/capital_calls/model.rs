//! Database model for capital calls.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::{parse_decimal, parse_enum};
use fundflow_core::allocations::AmountType;
use fundflow_core::capital_calls::{CapitalCall, CapitalCallStatus};
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
#[diesel(table_name = crate::schema::capital_calls)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
#[diesel(treat_none_as_null = true)]
pub struct CapitalCallDB {
    pub id: String,
    pub allocation_id: String,
    pub call_amount: String,
    pub amount_type: String,
    pub call_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: String,
    pub paid_amount: String,
    pub outstanding_amount: String,
    pub paid_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<CapitalCall> for CapitalCallDB {
    fn from(call: CapitalCall) -> Self {
        Self {
            id: call.id,
            allocation_id: call.allocation_id,
            call_amount: call.call_amount.to_string(),
            amount_type: call.amount_type.as_db_str().to_string(),
            call_date: call.call_date,
            due_date: call.due_date,
            status: call.status.as_db_str().to_string(),
            paid_amount: call.paid_amount.to_string(),
            outstanding_amount: call.outstanding_amount.to_string(),
            paid_date: call.paid_date,
            notes: call.notes,
            created_at: call.created_at,
            updated_at: call.updated_at,
        }
    }
}

impl TryFrom<CapitalCallDB> for CapitalCall {
    type Error = Error;

    fn try_from(db: CapitalCallDB) -> Result<Self, Self::Error> {
        Ok(Self {
            call_amount: parse_decimal("capital_calls.call_amount", &db.call_amount)?,
            amount_type: parse_enum(
                "capital_calls.amount_type",
                &db.amount_type,
                AmountType::from_db_str,
            )?,
            status: parse_enum(
                "capital_calls.status",
                &db.status,
                CapitalCallStatus::from_db_str,
            )?,
            paid_amount: parse_decimal("capital_calls.paid_amount", &db.paid_amount)?,
            outstanding_amount: parse_decimal(
                "capital_calls.outstanding_amount",
                &db.outstanding_amount,
            )?,
            id: db.id,
            allocation_id: db.allocation_id,
            call_date: db.call_date,
            due_date: db.due_date,
            paid_date: db.paid_date,
            notes: db.notes,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

pub(crate) fn into_domain(rows: Vec<CapitalCallDB>) -> fundflow_core::Result<Vec<CapitalCall>> {
    rows.into_iter().map(CapitalCall::try_from).collect()
}
