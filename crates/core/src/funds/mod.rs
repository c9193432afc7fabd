mod funds_model;
mod funds_service;
mod funds_traits;

pub use funds_model::{Fund, NewFund};
pub use funds_service::FundService;
pub use funds_traits::{FundRepositoryTrait, FundServiceTrait};
