//! Input validation and duplicate-submission handling shared by the services.

mod idempotency;
mod validation;

pub use idempotency::{create_or_get_existing, CreateResult};
pub use validation::FieldValidator;
