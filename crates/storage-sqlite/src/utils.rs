//! Column conversion helpers shared by the repositories.
//!
//! Amounts are stored as TEXT so they round-trip through SQLite without
//! floating point loss; enums are stored as their snake_case database names.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::errors::StorageError;
use fundflow_core::Result;

pub(crate) fn parse_decimal(column: &'static str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|_| {
        StorageError::InvalidColumn {
            column,
            value: value.to_string(),
        }
        .into()
    })
}

pub(crate) fn parse_enum<T>(
    column: &'static str,
    value: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T> {
    parse(value).ok_or_else(|| {
        StorageError::InvalidColumn {
            column,
            value: value.to_string(),
        }
        .into()
    })
}

/// Time-ordered ids, so ties on timestamps still sort by insertion.
pub(crate) fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
