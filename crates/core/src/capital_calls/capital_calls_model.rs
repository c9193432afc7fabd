//! Capital call domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocations::AmountType;
use crate::integrity::FieldValidator;
use crate::Result;

/// Lifecycle state of a single capital call.
///
/// `Partial` and `PartiallyPaid` are distinct states with their own
/// transitions. The ledger produces `PartiallyPaid`; `Partial` is entered
/// only through an explicit status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CapitalCallStatus {
    #[default]
    Scheduled,
    Called,
    Partial,
    PartiallyPaid,
    Overdue,
    Paid,
    Defaulted,
}

impl CapitalCallStatus {
    pub const ALL: [CapitalCallStatus; 7] = [
        CapitalCallStatus::Scheduled,
        CapitalCallStatus::Called,
        CapitalCallStatus::Partial,
        CapitalCallStatus::PartiallyPaid,
        CapitalCallStatus::Overdue,
        CapitalCallStatus::Paid,
        CapitalCallStatus::Defaulted,
    ];

    /// Returns the database string representation.
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            CapitalCallStatus::Scheduled => "scheduled",
            CapitalCallStatus::Called => "called",
            CapitalCallStatus::Partial => "partial",
            CapitalCallStatus::PartiallyPaid => "partially_paid",
            CapitalCallStatus::Overdue => "overdue",
            CapitalCallStatus::Paid => "paid",
            CapitalCallStatus::Defaulted => "defaulted",
        }
    }

    /// Parses a status from its database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_db_str() == s)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CapitalCallStatus::Paid | CapitalCallStatus::Defaulted)
    }

    pub fn is_partial(&self) -> bool {
        matches!(
            self,
            CapitalCallStatus::Partial | CapitalCallStatus::PartiallyPaid
        )
    }

    /// True once the call has been issued to the investor.
    pub fn is_issued(&self) -> bool {
        *self != CapitalCallStatus::Scheduled
    }
}

/// A scheduled or settled cash call against an allocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CapitalCall {
    pub id: String,
    pub allocation_id: String,
    pub call_amount: Decimal,
    pub amount_type: AmountType,
    pub call_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: CapitalCallStatus,
    /// Materialized from the payment log; never authored directly.
    pub paid_amount: Decimal,
    pub outstanding_amount: Decimal,
    pub paid_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// `max(0, call - paid)`.
pub fn outstanding_amount(call_amount: Decimal, paid_amount: Decimal) -> Decimal {
    (call_amount - paid_amount).max(Decimal::ZERO)
}

/// Fully resolved record handed to storage for insertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewCapitalCall {
    pub allocation_id: String,
    pub call_amount: Decimal,
    pub amount_type: AmountType,
    pub call_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: CapitalCallStatus,
    pub paid_amount: Decimal,
    pub paid_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl NewCapitalCall {
    /// Defaulted calls carry no outstanding balance.
    pub fn outstanding_amount(&self) -> Decimal {
        if self.status == CapitalCallStatus::Defaulted {
            Decimal::ZERO
        } else {
            outstanding_amount(self.call_amount, self.paid_amount)
        }
    }
}

/// Caller input for creating one capital call directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCapitalCallRequest {
    pub allocation_id: String,
    pub call_amount: Decimal,
    /// Defaults to the allocation's amount type.
    pub amount_type: Option<AmountType>,
    /// Defaults to today.
    pub call_date: Option<NaiveDate>,
    /// Defaults to `call_date` plus the configured grace period.
    pub due_date: Option<NaiveDate>,
    pub status: Option<CapitalCallStatus>,
    pub paid_amount: Option<Decimal>,
    pub paid_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl CreateCapitalCallRequest {
    pub fn validate(&self) -> Result<()> {
        let mut validator = FieldValidator::new();
        validator
            .require_text("allocationId", &self.allocation_id)
            .require_positive("callAmount", self.call_amount)
            .require_not_before("dueDate", self.due_date, "callDate", self.call_date);
        if let Some(paid) = self.paid_amount {
            validator.require_non_negative("paidAmount", paid).check(
                paid <= self.call_amount,
                "paidAmount",
                "cannot exceed callAmount",
            );
        }
        validator.finish()
    }
}

/// Requested status change for one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalCallStatusUpdate {
    pub status: CapitalCallStatus,
    pub paid_amount: Option<Decimal>,
    pub paid_date: Option<NaiveDate>,
}

/// Reschedule request for an unpaid call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalCallDatesUpdate {
    pub call_date: NaiveDate,
    /// Defaults to `call_date` plus the configured grace period.
    pub due_date: Option<NaiveDate>,
}

/// Cadence used to split a commitment into calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    Single,
    Monthly,
    Quarterly,
    Biannual,
    Annual,
    Custom,
}

impl ScheduleType {
    /// Months between consecutive calls for regular schedules.
    pub const fn month_interval(&self) -> Option<u32> {
        match self {
            ScheduleType::Monthly => Some(1),
            ScheduleType::Quarterly => Some(3),
            ScheduleType::Biannual => Some(6),
            ScheduleType::Annual => Some(12),
            ScheduleType::Single | ScheduleType::Custom => None,
        }
    }
}

/// One explicit entry of a custom schedule. Exactly one of `percentage` or
/// `dollar_amount` is expected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomCallEntry {
    pub date: NaiveDate,
    pub percentage: Option<Decimal>,
    pub dollar_amount: Option<Decimal>,
    /// Overrides the allocation's amount type for this call.
    pub amount_type: Option<AmountType>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateScheduleRequest {
    pub allocation_id: String,
    pub schedule_type: ScheduleType,
    pub call_count: Option<u32>,
    /// Per-call percentage for regular schedules, or the single call's share.
    pub call_percentage: Option<Decimal>,
    /// Reference date used when the allocation has none.
    pub first_call_date: Option<NaiveDate>,
    #[serde(default)]
    pub custom_schedule: Vec<CustomCallEntry>,
    pub notes: Option<String>,
}

/// The slice of an allocation the schedule generator reads.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleAllocation {
    pub amount: Decimal,
    pub amount_type: AmountType,
    pub allocation_date: Option<NaiveDate>,
}

/// Result of persisting a generated schedule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSchedule {
    pub capital_calls: Vec<CapitalCall>,
    pub created_count: usize,
    pub existing_count: usize,
}
