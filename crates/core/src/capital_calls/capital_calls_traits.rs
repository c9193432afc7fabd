use async_trait::async_trait;
use chrono::NaiveDate;

use crate::capital_calls::capital_calls_model::{
    CapitalCall, CapitalCallDatesUpdate, CapitalCallStatusUpdate, CreateCapitalCallRequest,
    GenerateScheduleRequest, GeneratedSchedule, NewCapitalCall,
};
use crate::errors::Result;
use crate::integrity::CreateResult;

/// Persistence operations for capital calls.
///
/// `create_capital_call` must fail with `DatabaseError::UniqueViolation` when a
/// call already exists for the same allocation and call date.
#[async_trait]
pub trait CapitalCallRepositoryTrait: Send + Sync {
    async fn get_capital_call(&self, capital_call_id: &str) -> Result<Option<CapitalCall>>;
    /// Calls for one allocation, ordered by call date.
    async fn get_capital_calls_by_allocation(&self, allocation_id: &str)
        -> Result<Vec<CapitalCall>>;
    async fn find_capital_call(
        &self,
        allocation_id: &str,
        call_date: NaiveDate,
    ) -> Result<Option<CapitalCall>>;
    async fn create_capital_call(&self, new_call: NewCapitalCall) -> Result<CapitalCall>;
    async fn update_capital_call(&self, call: CapitalCall) -> Result<CapitalCall>;
    /// Unsettled calls (scheduled, called, partial, partially paid) due strictly before `date`.
    async fn get_open_capital_calls_due_before(&self, date: NaiveDate)
        -> Result<Vec<CapitalCall>>;
}

/// Trait for capital call service operations
#[async_trait]
pub trait CapitalCallServiceTrait: Send + Sync {
    async fn create_capital_call(
        &self,
        request: CreateCapitalCallRequest,
    ) -> Result<CreateResult<CapitalCall>>;
    async fn generate_capital_calls(
        &self,
        request: GenerateScheduleRequest,
    ) -> Result<GeneratedSchedule>;
    async fn update_capital_call_status(
        &self,
        capital_call_id: &str,
        update: CapitalCallStatusUpdate,
    ) -> Result<CapitalCall>;
    async fn update_capital_call_dates(
        &self,
        capital_call_id: &str,
        update: CapitalCallDatesUpdate,
    ) -> Result<CapitalCall>;
    async fn get_capital_call(&self, capital_call_id: &str) -> Result<CapitalCall>;
    async fn get_capital_calls_by_allocation(&self, allocation_id: &str)
        -> Result<Vec<CapitalCall>>;
    /// Moves every unsettled call due before `as_of` to `overdue`.
    async fn mark_overdue_capital_calls(&self, as_of: NaiveDate) -> Result<Vec<CapitalCall>>;
}
