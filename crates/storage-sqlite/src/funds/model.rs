//! Database model for funds.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use fundflow_core::funds::Fund;

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
#[diesel(table_name = crate::schema::funds)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct FundDB {
    pub id: String,
    pub name: String,
    pub vintage_year: Option<i32>,
    pub currency: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<FundDB> for Fund {
    fn from(db: FundDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            vintage_year: db.vintage_year,
            currency: db.currency,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
