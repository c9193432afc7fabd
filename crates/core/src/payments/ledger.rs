//! Payment ledger arithmetic.
//!
//! The payment log is the source of truth for how much a call has received.
//! `paid_amount` and `outstanding_amount` on a call are a cache recomputed
//! from the log every time a payment lands.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::Payment;
use crate::capital_calls::{validate_transition, CapitalCall, CapitalCallError, CapitalCallStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentTotals {
    pub total_paid: Decimal,
    pub payment_count: usize,
    pub last_payment_date: Option<NaiveDate>,
}

/// Folds a call's payment log into totals.
pub fn summarize_payments(payments: &[Payment]) -> PaymentTotals {
    payments
        .iter()
        .fold(PaymentTotals::default(), |mut totals, payment| {
            totals.total_paid += payment.amount;
            totals.payment_count += 1;
            totals.last_payment_date = totals.last_payment_date.max(Some(payment.payment_date));
            totals
        })
}

/// Call state after a payment is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerOutcome {
    pub status: CapitalCallStatus,
    pub paid_amount: Decimal,
    pub outstanding_amount: Decimal,
    pub paid_date: Option<NaiveDate>,
}

impl LedgerOutcome {
    pub fn apply_to(&self, call: &mut CapitalCall) {
        call.status = self.status;
        call.paid_amount = self.paid_amount;
        call.outstanding_amount = self.outstanding_amount;
        call.paid_date = self.paid_date;
    }
}

/// Computes the effect of adding `amount` to a call whose log already totals
/// `logged_total`.
///
/// Overpayment is rejected unless allowed; even then the cached paid amount
/// is capped at the call amount. A call already in `partial` stays there
/// rather than hopping to `partially_paid`, which the transition table does
/// not allow.
pub fn apply_payment(
    call: &CapitalCall,
    logged_total: Decimal,
    amount: Decimal,
    payment_date: NaiveDate,
    allow_overpayments: bool,
) -> Result<LedgerOutcome, CapitalCallError> {
    let call_amount = call.call_amount;
    let total = logged_total + amount;
    if total > call_amount && !allow_overpayments {
        return Err(CapitalCallError::OverpaymentRejected {
            attempted: amount,
            max_allowed: (call_amount - logged_total).max(Decimal::ZERO),
        });
    }

    let paid_amount = total.min(call_amount);
    let outstanding_amount = call_amount - paid_amount;
    let derived = if outstanding_amount.is_zero() {
        CapitalCallStatus::Paid
    } else if paid_amount > Decimal::ZERO {
        CapitalCallStatus::PartiallyPaid
    } else {
        call.status
    };
    let status = if derived.is_partial() && call.status.is_partial() {
        call.status
    } else {
        derived
    };

    if status != call.status {
        validate_transition(call.status, status)?;
    }

    Ok(LedgerOutcome {
        status,
        paid_amount,
        outstanding_amount,
        paid_date: Some(payment_date),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocations::AmountType;
    use crate::payments::PaymentType;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn call(status: CapitalCallStatus, paid: Decimal) -> CapitalCall {
        let now = date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap();
        CapitalCall {
            id: "call-1".to_string(),
            allocation_id: "alloc-1".to_string(),
            call_amount: dec!(50000),
            amount_type: AmountType::Dollar,
            call_date: date(2024, 1, 1),
            due_date: date(2024, 1, 15),
            status,
            paid_amount: paid,
            outstanding_amount: dec!(50000) - paid,
            paid_date: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn payment(amount: Decimal, day: u32) -> Payment {
        Payment {
            id: format!("pay-{}", day),
            capital_call_id: "call-1".to_string(),
            amount,
            payment_date: date(2024, 1, day),
            payment_type: PaymentType::Wire,
            notes: None,
            created_by: None,
            created_at: date(2024, 1, day).and_hms_opt(12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_summarize_payments() {
        let totals = summarize_payments(&[payment(dec!(100), 9), payment(dec!(250.50), 3)]);
        assert_eq!(totals.total_paid, dec!(350.50));
        assert_eq!(totals.payment_count, 2);
        assert_eq!(totals.last_payment_date, Some(date(2024, 1, 9)));
        assert_eq!(summarize_payments(&[]), PaymentTotals::default());
    }

    #[test]
    fn test_partial_then_overpayment_rejected() {
        let c = call(CapitalCallStatus::Called, dec!(0));
        let first = apply_payment(&c, dec!(0), dec!(30000), date(2024, 1, 10), false).unwrap();
        assert_eq!(first.status, CapitalCallStatus::PartiallyPaid);
        assert_eq!(first.outstanding_amount, dec!(20000));

        let mut after = c.clone();
        first.apply_to(&mut after);
        let err = apply_payment(&after, dec!(30000), dec!(25000), date(2024, 1, 11), false)
            .unwrap_err();
        assert_eq!(
            err,
            CapitalCallError::OverpaymentRejected {
                attempted: dec!(25000),
                max_allowed: dec!(20000)
            }
        );
    }

    #[test]
    fn test_allowed_overpayment_caps_cached_amount() {
        let c = call(CapitalCallStatus::PartiallyPaid, dec!(30000));
        let outcome = apply_payment(&c, dec!(30000), dec!(25000), date(2024, 1, 12), true).unwrap();
        assert_eq!(outcome.status, CapitalCallStatus::Paid);
        assert_eq!(outcome.paid_amount, dec!(50000));
        assert_eq!(outcome.outstanding_amount, dec!(0));
    }

    #[test]
    fn test_partial_status_is_kept() {
        let c = call(CapitalCallStatus::Partial, dec!(10000));
        let outcome = apply_payment(&c, dec!(10000), dec!(5000), date(2024, 1, 12), false).unwrap();
        assert_eq!(outcome.status, CapitalCallStatus::Partial);
        assert_eq!(outcome.paid_amount, dec!(15000));
    }

    #[test]
    fn test_defaulted_call_cannot_take_payments() {
        let c = call(CapitalCallStatus::Defaulted, dec!(0));
        let err = apply_payment(&c, dec!(0), dec!(100), date(2024, 2, 1), false).unwrap_err();
        assert!(matches!(err, CapitalCallError::InvalidTransition { .. }));
    }
}
