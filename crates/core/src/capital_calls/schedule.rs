//! Turns an allocation and schedule parameters into capital call records.
//!
//! Everything here is pure: no storage, no clock. The reference date for
//! every schedule is the allocation's own date, falling back to the caller's
//! first-call date, so regenerated schedules line up with the allocation even
//! when requests arrive out of order.

use chrono::NaiveDate;
use log::debug;
use rust_decimal::{Decimal, RoundingStrategy};

use super::{
    CapitalCallError, CapitalCallStatus, CustomCallEntry, GenerateScheduleRequest,
    NewCapitalCall, ScheduleAllocation, ScheduleType,
};
use crate::allocations::AmountType;
use crate::constants::{
    AMOUNT_DECIMAL_PRECISION, FULL_COMMITMENT_PERCENTAGE, MAX_SCHEDULE_CALLS,
    PERCENTAGE_DECIMAL_PRECISION,
};
use crate::errors::{Error, ValidationError};
use crate::utils::time_utils::{add_days, add_months};
use crate::Result;

fn invalid(message: impl Into<String>) -> Error {
    Error::CapitalCall(CapitalCallError::InvalidSchedule(message.into()))
}

fn due_date_for(call_date: NaiveDate, due_days: i64) -> Result<NaiveDate> {
    add_days(call_date, due_days)
        .ok_or_else(|| invalid(format!("due date out of range for call on {}", call_date)))
}

/// `amount * pct / 100`, rounded to cents.
fn dollar_share(amount: Decimal, percentage: Decimal) -> Decimal {
    (amount * percentage / FULL_COMMITMENT_PERCENTAGE).round_dp(AMOUNT_DECIMAL_PRECISION)
}

/// Call amount for a share of the commitment, honouring the amount type.
fn call_amount_for(allocation: &ScheduleAllocation, percentage: Decimal) -> Decimal {
    match allocation.amount_type {
        AmountType::Dollar => dollar_share(allocation.amount, percentage),
        AmountType::Percentage => percentage,
    }
}

pub fn generate_schedule(
    allocation: &ScheduleAllocation,
    request: &GenerateScheduleRequest,
    due_days: i64,
) -> Result<Vec<NewCapitalCall>> {
    let reference_date = allocation
        .allocation_date
        .or(request.first_call_date)
        .ok_or_else(|| Error::Validation(ValidationError::MissingField("firstCallDate".into())))?;

    debug!(
        "Generating {:?} schedule for allocation {} from {}",
        request.schedule_type, request.allocation_id, reference_date
    );

    match request.schedule_type {
        ScheduleType::Single => single_call(allocation, request, reference_date, due_days),
        ScheduleType::Custom => custom_calls(allocation, request, due_days),
        regular => {
            let interval = regular.month_interval().ok_or_else(|| {
                invalid(format!("{:?} is not a regular schedule", regular))
            })?;
            regular_calls(allocation, request, reference_date, interval, due_days)
        }
    }
}

/// One call, settled on creation.
fn single_call(
    allocation: &ScheduleAllocation,
    request: &GenerateScheduleRequest,
    reference_date: NaiveDate,
    due_days: i64,
) -> Result<Vec<NewCapitalCall>> {
    let percentage = request.call_percentage.unwrap_or(FULL_COMMITMENT_PERCENTAGE);
    if percentage <= Decimal::ZERO || percentage > FULL_COMMITMENT_PERCENTAGE {
        return Err(invalid("single call percentage must be between 0 and 100"));
    }

    let call_amount = call_amount_for(allocation, percentage);
    Ok(vec![NewCapitalCall {
        allocation_id: request.allocation_id.clone(),
        call_amount,
        amount_type: allocation.amount_type,
        call_date: reference_date,
        due_date: due_date_for(reference_date, due_days)?,
        status: CapitalCallStatus::Paid,
        paid_amount: call_amount,
        paid_date: Some(reference_date),
        notes: request.notes.clone(),
    }])
}

/// Equal calls stepping by `interval` months. The shared amount is truncated
/// to the stored precision and the last call takes the remainder, so it is
/// never smaller than the others.
fn regular_calls(
    allocation: &ScheduleAllocation,
    request: &GenerateScheduleRequest,
    reference_date: NaiveDate,
    interval: u32,
    due_days: i64,
) -> Result<Vec<NewCapitalCall>> {
    let count = request
        .call_count
        .filter(|count| *count > 0)
        .ok_or_else(|| invalid("callCount must be at least 1 for a regular schedule"))?;
    if count > MAX_SCHEDULE_CALLS {
        return Err(invalid(format!(
            "callCount {} exceeds the limit of {}",
            count, MAX_SCHEDULE_CALLS
        )));
    }

    let total = match allocation.amount_type {
        AmountType::Dollar => allocation.amount,
        AmountType::Percentage => FULL_COMMITMENT_PERCENTAGE,
    };
    let per_call = match request.call_percentage {
        Some(pct) if pct <= Decimal::ZERO => {
            return Err(invalid("callPercentage must be greater than zero"))
        }
        Some(pct) => call_amount_for(allocation, pct),
        None => even_share(total, count, allocation.amount_type),
    };
    if per_call <= Decimal::ZERO {
        return Err(invalid(format!(
            "{} calls would split {} into zero-amount calls",
            count, total
        )));
    }
    if count > 1 && per_call * Decimal::from(count - 1) >= total {
        return Err(invalid(format!(
            "{} calls of {} leave nothing for the final call",
            count - 1,
            per_call
        )));
    }

    let mut calls = Vec::with_capacity(count as usize);
    let mut allotted = Decimal::ZERO;
    for index in 0..count {
        let call_date = add_months(reference_date, interval * index)
            .ok_or_else(|| invalid("call date out of range"))?;
        let call_amount = if index + 1 == count {
            total - allotted
        } else {
            per_call
        };
        allotted += call_amount;

        calls.push(NewCapitalCall {
            allocation_id: request.allocation_id.clone(),
            call_amount,
            amount_type: allocation.amount_type,
            call_date,
            due_date: due_date_for(call_date, due_days)?,
            status: CapitalCallStatus::Scheduled,
            paid_amount: Decimal::ZERO,
            paid_date: None,
            notes: request.notes.clone(),
        });
    }
    Ok(calls)
}

/// `total / count`, truncated so the leading calls never overshoot.
fn even_share(total: Decimal, count: u32, amount_type: AmountType) -> Decimal {
    let precision = match amount_type {
        AmountType::Dollar => AMOUNT_DECIMAL_PRECISION,
        AmountType::Percentage => PERCENTAGE_DECIMAL_PRECISION,
    };
    (total / Decimal::from(count)).round_dp_with_strategy(precision, RoundingStrategy::ToZero)
}

fn custom_calls(
    allocation: &ScheduleAllocation,
    request: &GenerateScheduleRequest,
    due_days: i64,
) -> Result<Vec<NewCapitalCall>> {
    if request.custom_schedule.is_empty() {
        return Err(invalid("custom schedule has no entries"));
    }

    let mut entries: Vec<&CustomCallEntry> = request.custom_schedule.iter().collect();
    entries.sort_by_key(|entry| entry.date);
    if entries.windows(2).any(|pair| pair[0].date == pair[1].date) {
        return Err(invalid("custom schedule has two calls on the same date"));
    }

    let mut implied_total = Decimal::ZERO;
    let mut calls = Vec::with_capacity(entries.len());
    for entry in entries {
        let (call_amount, amount_type, implied_percentage) = custom_amount(allocation, entry)?;
        if call_amount <= Decimal::ZERO {
            return Err(invalid(format!("call on {} must have a positive amount", entry.date)));
        }
        implied_total += implied_percentage.unwrap_or(Decimal::ZERO);

        let due_date = match entry.due_date {
            Some(due) if due < entry.date => {
                return Err(invalid(format!("call on {} is due before it is called", entry.date)))
            }
            Some(due) => due,
            None => due_date_for(entry.date, due_days)?,
        };

        calls.push(NewCapitalCall {
            allocation_id: request.allocation_id.clone(),
            call_amount,
            amount_type,
            call_date: entry.date,
            due_date,
            status: CapitalCallStatus::Scheduled,
            paid_amount: Decimal::ZERO,
            paid_date: None,
            notes: request.notes.clone(),
        });
    }

    if implied_total > FULL_COMMITMENT_PERCENTAGE {
        return Err(invalid(format!(
            "custom schedule calls {}% of the commitment",
            implied_total
        )));
    }
    Ok(calls)
}

/// Resolves one custom entry to `(call_amount, amount_type, share_of_commitment)`.
fn custom_amount(
    allocation: &ScheduleAllocation,
    entry: &CustomCallEntry,
) -> Result<(Decimal, AmountType, Option<Decimal>)> {
    let amount_type = entry.amount_type.unwrap_or(allocation.amount_type);
    let dollar_base = match allocation.amount_type {
        AmountType::Dollar if allocation.amount > Decimal::ZERO => Some(allocation.amount),
        _ => None,
    };

    let percentage = match (entry.percentage, entry.dollar_amount) {
        (Some(pct), _) => Some(pct),
        (None, Some(dollars)) => dollar_base.map(|base| {
            (dollars / base * FULL_COMMITMENT_PERCENTAGE).round_dp(AMOUNT_DECIMAL_PRECISION)
        }),
        (None, None) => {
            return Err(invalid(format!(
                "call on {} needs a percentage or a dollar amount",
                entry.date
            )))
        }
    };

    let call_amount = match amount_type {
        AmountType::Percentage => percentage.ok_or_else(|| {
            invalid(format!(
                "call on {} cannot be expressed as a percentage of this allocation",
                entry.date
            ))
        })?,
        AmountType::Dollar => match (entry.dollar_amount, entry.percentage, dollar_base) {
            (Some(dollars), _, _) => dollars,
            (None, Some(pct), Some(base)) => dollar_share(base, pct),
            _ => {
                return Err(invalid(format!(
                    "call on {} has no dollar base to convert its percentage",
                    entry.date
                )))
            }
        },
    };

    Ok((call_amount, amount_type, percentage))
}
