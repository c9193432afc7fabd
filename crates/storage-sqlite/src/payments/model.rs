//! Database model for capital call payments.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::{parse_decimal, parse_enum};
use fundflow_core::errors::Error;
use fundflow_core::payments::{Payment, PaymentType};

/// Rows are insert-only; there is no changeset.
#[derive(
    Queryable,
    Selectable,
    Insertable,
    Identifiable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::capital_call_payments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct PaymentDB {
    pub id: String,
    pub capital_call_id: String,
    pub amount: String,
    pub payment_date: NaiveDate,
    pub payment_type: String,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<PaymentDB> for Payment {
    type Error = Error;

    fn try_from(db: PaymentDB) -> Result<Self, Self::Error> {
        Ok(Self {
            amount: parse_decimal("capital_call_payments.amount", &db.amount)?,
            payment_type: parse_enum(
                "capital_call_payments.payment_type",
                &db.payment_type,
                PaymentType::from_db_str,
            )?,
            id: db.id,
            capital_call_id: db.capital_call_id,
            payment_date: db.payment_date,
            notes: db.notes,
            created_by: db.created_by,
            created_at: db.created_at,
        })
    }
}
