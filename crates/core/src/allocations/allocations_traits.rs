use async_trait::async_trait;
use chrono::NaiveDate;

use crate::allocations::allocations_model::{
    AllocationFundingSummary, AllocationStatus, FundAllocation, NewFundAllocation,
};
use crate::allocations::portfolio_weights::AllocationWeight;
use crate::errors::Result;
use crate::integrity::CreateResult;

/// Persistence operations for fund allocations.
///
/// `create_allocation` must fail with `DatabaseError::UniqueViolation` when an
/// allocation already exists for the same fund, deal, and allocation date.
#[async_trait]
pub trait AllocationRepositoryTrait: Send + Sync {
    async fn get_allocation(&self, allocation_id: &str) -> Result<Option<FundAllocation>>;
    async fn get_allocations_by_fund(&self, fund_id: &str) -> Result<Vec<FundAllocation>>;
    async fn find_allocation(
        &self,
        fund_id: &str,
        deal_id: &str,
        allocation_date: NaiveDate,
    ) -> Result<Option<FundAllocation>>;
    async fn create_allocation(&self, new_allocation: NewFundAllocation) -> Result<FundAllocation>;
    async fn update_allocation_status(
        &self,
        allocation_id: &str,
        status: AllocationStatus,
    ) -> Result<FundAllocation>;
    /// Writes every weight for the fund in one atomic unit.
    async fn update_portfolio_weights(
        &self,
        fund_id: &str,
        weights: Vec<AllocationWeight>,
    ) -> Result<usize>;
}

/// Trait for allocation service operations
#[async_trait]
pub trait AllocationServiceTrait: Send + Sync {
    async fn create_allocation(
        &self,
        new_allocation: NewFundAllocation,
    ) -> Result<CreateResult<FundAllocation>>;
    async fn get_allocation(&self, allocation_id: &str) -> Result<FundAllocation>;
    async fn get_fund_allocations(&self, fund_id: &str) -> Result<Vec<FundAllocation>>;
    /// Re-derives the allocation's funding status from its capital calls.
    async fn refresh_allocation_status(&self, allocation_id: &str) -> Result<FundAllocation>;
    async fn get_funding_summary(&self, allocation_id: &str) -> Result<AllocationFundingSummary>;
}

#[async_trait]
pub trait PortfolioWeightServiceTrait: Send + Sync {
    /// Recomputes weights for every allocation in the fund. Returns `None`
    /// when the fund has no funded capital and nothing was written.
    async fn recalculate_portfolio_weights(
        &self,
        fund_id: &str,
    ) -> Result<Option<Vec<AllocationWeight>>>;
}
