//! SQLite storage implementation for the capital call payment log.

mod model;
mod repository;

pub use model::PaymentDB;
pub use repository::PaymentRepository;

pub use fundflow_core::payments::PaymentRepositoryTrait;
