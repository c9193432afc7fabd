//! Domain events module.
//!
//! Event types and the sink trait services emit through after successful
//! mutations.

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;
