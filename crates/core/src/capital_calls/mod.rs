//! Capital calls module - schedule generation, status transitions, and services.

mod capital_calls_errors;
mod capital_calls_model;
mod capital_calls_service;
mod capital_calls_traits;
mod schedule;
mod state_machine;

#[cfg(test)]
mod capital_calls_service_tests;

pub use capital_calls_errors::CapitalCallError;
pub use capital_calls_model::{
    outstanding_amount, CapitalCall, CapitalCallDatesUpdate, CapitalCallStatus,
    CapitalCallStatusUpdate, CreateCapitalCallRequest, CustomCallEntry, GenerateScheduleRequest,
    GeneratedSchedule, NewCapitalCall, ScheduleAllocation, ScheduleType,
};
pub use capital_calls_service::CapitalCallService;
pub use capital_calls_traits::{CapitalCallRepositoryTrait, CapitalCallServiceTrait};
pub use schedule::generate_schedule;
pub use state_machine::{
    check_paid_amount, resolve_status_update, validate_transition, StatusResolution,
};
