//! Allocations module - committed capital, funding status, and portfolio weights.

mod allocations_model;
mod allocations_service;
mod allocations_traits;
mod funding_status;
mod portfolio_weight_service;
mod portfolio_weights;


pub use allocations_model::{
    AllocationFundingSummary, AllocationStatus, AmountType, FundAllocation, NewFundAllocation,
};
pub use allocations_service::AllocationService;
pub use allocations_traits::{
    AllocationRepositoryTrait, AllocationServiceTrait, PortfolioWeightServiceTrait,
};
pub use funding_status::{derive_funding_status, summarize_calls, CallTotals};
pub use portfolio_weight_service::PortfolioWeightService;
pub use portfolio_weights::{compute_portfolio_weights, AllocationWeight};
