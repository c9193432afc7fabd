//! Fundflow Core - capital-call administration for fund allocations.
//!
//! Turns committed allocations into capital-call schedules, applies payments,
//! and rolls call state up into allocation funding status and fund-wide
//! portfolio weights. The crate is storage-agnostic: persistence is reached
//! through the repository traits, implemented by the `storage-sqlite` crate.

pub mod allocations;
pub mod capital_calls;
pub mod constants;
pub mod errors;
pub mod events;
pub mod funds;
pub mod integrity;
pub mod payments;
pub mod settings;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
