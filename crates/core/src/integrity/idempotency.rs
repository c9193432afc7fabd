//! Duplicate-submission handling for create operations.
//!
//! Allocations and capital calls carry natural unique keys in storage
//! (`fund_id + deal_id + allocation_date` and `allocation_id + call_date`).
//! A retried create trips the unique constraint; instead of surfacing that as
//! a failure the existing record is looked up and returned with `is_new`
//! set to `false`.

use std::future::Future;

use log::{debug, info};
use serde::Serialize;

use crate::Result;

/// Outcome of an idempotent create.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResult<T> {
    pub record: T,
    pub is_new: bool,
}

impl<T> CreateResult<T> {
    pub fn created(record: T) -> Self {
        Self {
            record,
            is_new: true,
        }
    }

    pub fn existing(record: T) -> Self {
        Self {
            record,
            is_new: false,
        }
    }

    pub fn into_inner(self) -> T {
        self.record
    }
}

/// Runs `create`; on a unique violation resolves to the record found by `lookup`.
///
/// If the lookup comes back empty the original violation is returned, since
/// the conflicting row is not the one the caller described.
pub async fn create_or_get_existing<T, C, L, LF>(
    entity: &str,
    create: C,
    lookup: L,
) -> Result<CreateResult<T>>
where
    C: Future<Output = Result<T>>,
    L: FnOnce() -> LF,
    LF: Future<Output = Result<Option<T>>>,
{
    match create.await {
        Ok(record) => Ok(CreateResult::created(record)),
        Err(err) if err.is_unique_violation() => {
            debug!("{} create hit unique constraint: {}", entity, err);
            match lookup().await? {
                Some(existing) => {
                    info!("Duplicate {} submission resolved to existing record", entity);
                    Ok(CreateResult::existing(existing))
                }
                None => Err(err),
            }
        }
        Err(err) => Err(err),
    }
}
