//! Allocation funding status derived from capital calls.

use rust_decimal::Decimal;

use super::AllocationStatus;
use crate::capital_calls::{CapitalCall, CapitalCallStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallTotals {
    /// Call amounts of issued calls (anything past `scheduled`).
    pub total_called: Decimal,
    /// Paid amounts of calls in `paid` status.
    pub total_paid: Decimal,
    pub total_outstanding: Decimal,
    pub call_count: usize,
    pub issued_call_count: usize,
    pub paid_call_count: usize,
}

pub fn summarize_calls(calls: &[CapitalCall]) -> CallTotals {
    let mut totals = CallTotals {
        call_count: calls.len(),
        ..CallTotals::default()
    };
    for call in calls.iter().filter(|call| call.status.is_issued()) {
        totals.total_called += call.call_amount;
        totals.total_outstanding += call.outstanding_amount;
        totals.issued_call_count += 1;
        if call.status == CapitalCallStatus::Paid {
            totals.total_paid += call.paid_amount;
            totals.paid_call_count += 1;
        }
    }
    totals
}

/// `committed` until issued capital is fully paid, then `funded`.
///
/// There is deliberately no partially-funded status: capital that has been
/// called but not fully paid still reads as `committed`.
pub fn derive_funding_status(totals: &CallTotals) -> AllocationStatus {
    if totals.total_called.is_zero() {
        AllocationStatus::Committed
    } else if totals.total_paid >= totals.total_called {
        AllocationStatus::Funded
    } else {
        AllocationStatus::Committed
    }
}
