//! SQLite storage implementation for capital calls.

mod model;
mod repository;

pub use model::CapitalCallDB;
pub use repository::CapitalCallRepository;

pub use fundflow_core::capital_calls::CapitalCallRepositoryTrait;
