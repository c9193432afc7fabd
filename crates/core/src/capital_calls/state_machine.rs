//! Status transitions for a single capital call.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{
    outstanding_amount, CapitalCall, CapitalCallError, CapitalCallStatus, CapitalCallStatusUpdate,
};

use CapitalCallStatus::*;

impl CapitalCallStatus {
    /// States reachable from `self` in one step.
    pub const fn allowed_transitions(&self) -> &'static [CapitalCallStatus] {
        match self {
            Scheduled => &[Called, Overdue, Defaulted, PartiallyPaid, Paid],
            Called => &[Partial, PartiallyPaid, Paid, Overdue, Defaulted],
            Partial | PartiallyPaid => &[Paid, Overdue, Defaulted],
            Overdue => &[Paid, Defaulted, Partial, PartiallyPaid],
            Paid | Defaulted => &[],
        }
    }

    pub fn can_transition_to(&self, next: CapitalCallStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

pub fn validate_transition(
    current: CapitalCallStatus,
    requested: CapitalCallStatus,
) -> Result<(), CapitalCallError> {
    if current.can_transition_to(requested) {
        Ok(())
    } else {
        Err(CapitalCallError::InvalidTransition { current, requested })
    }
}

/// Amount fields a validated status update resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusResolution {
    pub status: CapitalCallStatus,
    pub paid_amount: Decimal,
    pub outstanding_amount: Decimal,
    pub paid_date: Option<NaiveDate>,
}

impl StatusResolution {
    pub fn apply_to(&self, call: &mut CapitalCall) {
        call.status = self.status;
        call.paid_amount = self.paid_amount;
        call.outstanding_amount = self.outstanding_amount;
        call.paid_date = self.paid_date;
    }
}

/// Paid amount a call must carry to sit in `status`.
///
/// `paid` needs the full call amount and the partial states need an amount
/// strictly between zero and the call amount. Other states take whatever was
/// given, defaulting to zero.
pub fn check_paid_amount(
    status: CapitalCallStatus,
    paid_amount: Option<Decimal>,
    call_amount: Decimal,
) -> Result<Decimal, CapitalCallError> {
    let invalid = || CapitalCallError::InvalidPaidAmount {
        status,
        paid_amount,
        call_amount,
    };
    match status {
        Paid => paid_amount.filter(|paid| *paid == call_amount).ok_or_else(invalid),
        Partial | PartiallyPaid => paid_amount
            .filter(|paid| *paid > Decimal::ZERO && *paid < call_amount)
            .ok_or_else(invalid),
        _ => Ok(paid_amount.unwrap_or(Decimal::ZERO)),
    }
}

/// Checks the transition table and the amount rules for the target state.
///
/// `defaulted` writes off the outstanding balance; states that carry no
/// amount rule keep the call's current amounts.
pub fn resolve_status_update(
    call: &CapitalCall,
    update: &CapitalCallStatusUpdate,
    today: NaiveDate,
) -> Result<StatusResolution, CapitalCallError> {
    validate_transition(call.status, update.status)?;

    let call_amount = call.call_amount;
    let resolution = match update.status {
        Paid => {
            check_paid_amount(Paid, update.paid_amount, call_amount)?;
            StatusResolution {
                status: Paid,
                paid_amount: call_amount,
                outstanding_amount: Decimal::ZERO,
                paid_date: Some(update.paid_date.unwrap_or(today)),
            }
        }
        Partial | PartiallyPaid => {
            let paid = check_paid_amount(update.status, update.paid_amount, call_amount)?;
            StatusResolution {
                status: update.status,
                paid_amount: paid,
                outstanding_amount: call_amount - paid,
                paid_date: update.paid_date.or(call.paid_date),
            }
        }
        Defaulted => StatusResolution {
            status: Defaulted,
            paid_amount: call.paid_amount,
            outstanding_amount: Decimal::ZERO,
            paid_date: call.paid_date,
        },
        status => StatusResolution {
            status,
            paid_amount: call.paid_amount,
            outstanding_amount: outstanding_amount(call_amount, call.paid_amount),
            paid_date: call.paid_date,
        },
    };
    Ok(resolution)
}
