use rust_decimal::Decimal;
use thiserror::Error;

use super::CapitalCallStatus;

/// Business-rule failures raised by capital-call operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CapitalCallError {
    #[error("Invalid status transition from {} to {}", .current.as_db_str(), .requested.as_db_str())]
    InvalidTransition {
        current: CapitalCallStatus,
        requested: CapitalCallStatus,
    },

    #[error("Payment of {attempted} exceeds the outstanding amount (maximum allowed {max_allowed})")]
    OverpaymentRejected {
        attempted: Decimal,
        max_allowed: Decimal,
    },

    #[error("Paid amount {paid_amount:?} is not valid for status {} on a call of {call_amount}", .status.as_db_str())]
    InvalidPaidAmount {
        status: CapitalCallStatus,
        paid_amount: Option<Decimal>,
        call_amount: Decimal,
    },

    #[error("Capital call '{id}' is already paid and its dates cannot change")]
    AlreadySettled { id: String },

    #[error("Invalid capital call schedule: {0}")]
    InvalidSchedule(String),
}
