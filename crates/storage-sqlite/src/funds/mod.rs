//! SQLite storage implementation for funds.

mod model;
mod repository;

pub use model::FundDB;
pub use repository::FundRepository;

pub use fundflow_core::funds::FundRepositoryTrait;
