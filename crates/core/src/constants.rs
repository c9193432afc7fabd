use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Grace period (days) between a call date and its due date.
pub const DEFAULT_CAPITAL_CALL_DUE_DAYS: i64 = 14;

/// Total percentage a full commitment is split into.
pub const FULL_COMMITMENT_PERCENTAGE: Decimal = dec!(100);

/// Decimal places kept for dollar call amounts and schedule percentages
pub const AMOUNT_DECIMAL_PRECISION: u32 = 2;

/// Decimal places kept for per-call percentages of percentage allocations
pub const PERCENTAGE_DECIMAL_PRECISION: u32 = 6;

/// Upper bound on `callCount` for regular schedules (a century of monthly calls).
pub const MAX_SCHEDULE_CALLS: u32 = 1200;

/// Decimal places kept for portfolio weights
pub const WEIGHT_DECIMAL_PRECISION: u32 = 2;

/// Note attached to payments appended by a manual status change.
pub const STATUS_UPDATE_PAYMENT_NOTE: &str = "Recorded via status update";

/// Note attached to the payment seeded for a call created with a paid amount.
pub const OPENING_PAYMENT_NOTE: &str = "Recorded at call creation";

/// Currency used when a fund is created without one.
pub const DEFAULT_FUND_CURRENCY: &str = "USD";
