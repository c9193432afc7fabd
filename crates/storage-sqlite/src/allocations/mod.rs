//! SQLite storage implementation for fund allocations.

mod model;
mod repository;

pub use model::FundAllocationDB;
pub use repository::AllocationRepository;

pub use fundflow_core::allocations::AllocationRepositoryTrait;
