use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::schedule::generate_schedule;
use super::state_machine::{check_paid_amount, resolve_status_update};
use super::{
    CapitalCall, CapitalCallDatesUpdate, CapitalCallError, CapitalCallRepositoryTrait,
    CapitalCallServiceTrait, CapitalCallStatus, CapitalCallStatusUpdate,
    CreateCapitalCallRequest, GenerateScheduleRequest, GeneratedSchedule, NewCapitalCall,
    ScheduleAllocation, ScheduleType,
};
use crate::allocations::{AllocationRepositoryTrait, AllocationServiceTrait, FundAllocation};
use crate::constants::{OPENING_PAYMENT_NOTE, STATUS_UPDATE_PAYMENT_NOTE};
use crate::errors::{Error, ValidationError};
use crate::events::{DomainEvent, DomainEventSink};
use crate::integrity::{create_or_get_existing, CreateResult, FieldValidator};
use crate::payments::{summarize_payments, NewPayment, PaymentRepositoryTrait};
use crate::settings::{current_settings, CapitalCallSettings, SharedCapitalCallSettings};
use crate::utils::time_utils::{add_days, now_utc, today_utc};
use crate::utils::KeyedMutex;
use crate::Result;

/// Service for creating, scheduling, and transitioning capital calls.
pub struct CapitalCallService {
    capital_call_repository: Arc<dyn CapitalCallRepositoryTrait>,
    allocation_repository: Arc<dyn AllocationRepositoryTrait>,
    payment_repository: Arc<dyn PaymentRepositoryTrait>,
    allocation_service: Arc<dyn AllocationServiceTrait>,
    settings: SharedCapitalCallSettings,
    locks: Arc<KeyedMutex>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl CapitalCallService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        capital_call_repository: Arc<dyn CapitalCallRepositoryTrait>,
        allocation_repository: Arc<dyn AllocationRepositoryTrait>,
        payment_repository: Arc<dyn PaymentRepositoryTrait>,
        allocation_service: Arc<dyn AllocationServiceTrait>,
        settings: SharedCapitalCallSettings,
        locks: Arc<KeyedMutex>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            capital_call_repository,
            allocation_repository,
            payment_repository,
            allocation_service,
            settings,
            locks,
            event_sink,
        }
    }

    fn settings(&self) -> CapitalCallSettings {
        current_settings(&self.settings)
    }

    async fn require_call(&self, capital_call_id: &str) -> Result<CapitalCall> {
        self.capital_call_repository
            .get_capital_call(capital_call_id)
            .await?
            .ok_or_else(|| Error::not_found("Capital call", capital_call_id))
    }

    async fn require_allocation(&self, allocation_id: &str) -> Result<FundAllocation> {
        self.allocation_repository
            .get_allocation(allocation_id)
            .await?
            .ok_or_else(|| Error::not_found("Allocation", allocation_id))
    }

    fn default_due_date(call_date: NaiveDate, settings: &CapitalCallSettings) -> Result<NaiveDate> {
        add_days(call_date, settings.due_days).ok_or_else(|| {
            ValidationError::InvalidInput(format!("due date out of range for {}", call_date)).into()
        })
    }

    /// Persists one call idempotently. A new call created with a paid amount
    /// gets a matching opening payment so the log stays authoritative.
    async fn persist_call(
        &self,
        new_call: NewCapitalCall,
        settings: &CapitalCallSettings,
    ) -> Result<CreateResult<CapitalCall>> {
        let allocation_id = new_call.allocation_id.clone();
        let call_date = new_call.call_date;
        let opening_payment = (new_call.paid_amount > Decimal::ZERO)
            .then(|| (new_call.paid_amount, new_call.paid_date.unwrap_or(call_date)));

        let result = create_or_get_existing(
            "capital call",
            self.capital_call_repository.create_capital_call(new_call),
            || {
                self.capital_call_repository
                    .find_capital_call(&allocation_id, call_date)
            },
        )
        .await?;

        if result.is_new {
            if let Some((amount, payment_date)) = opening_payment {
                let payment = self
                    .payment_repository
                    .create_payment(NewPayment {
                        capital_call_id: result.record.id.clone(),
                        amount,
                        payment_date,
                        payment_type: settings.default_payment_type,
                        notes: Some(OPENING_PAYMENT_NOTE.to_string()),
                        created_by: None,
                    })
                    .await?;
                self.event_sink.emit(DomainEvent::payment_recorded(
                    payment.capital_call_id,
                    payment.id,
                    payment.amount,
                ));
            }
        }
        Ok(result)
    }

    /// Allocation status refresh is a downstream effect; failures are logged only.
    async fn cascade_allocation_status(&self, allocation_id: &str) {
        if let Err(e) = self
            .allocation_service
            .refresh_allocation_status(allocation_id)
            .await
        {
            error!(
                "Allocation status refresh for {} failed: {}",
                allocation_id, e
            );
        }
    }
}

#[async_trait]
impl CapitalCallServiceTrait for CapitalCallService {
    async fn create_capital_call(
        &self,
        request: CreateCapitalCallRequest,
    ) -> Result<CreateResult<CapitalCall>> {
        debug!(
            "Creating capital call of {} for allocation {}",
            request.call_amount, request.allocation_id
        );
        request.validate()?;
        let allocation = self.require_allocation(&request.allocation_id).await?;
        let settings = self.settings();

        let call_date = request.call_date.unwrap_or_else(today_utc);
        let due_date = match request.due_date {
            Some(due_date) => due_date,
            None => Self::default_due_date(call_date, &settings)?,
        };
        FieldValidator::new()
            .require_not_before("dueDate", Some(due_date), "callDate", Some(call_date))
            .finish()?;

        let status = request.status.unwrap_or_default();
        let requested_paid = match status {
            CapitalCallStatus::Paid => request.paid_amount.or(Some(request.call_amount)),
            _ => request.paid_amount,
        };
        let paid_amount = check_paid_amount(status, requested_paid, request.call_amount)?;
        let paid_date = request
            .paid_date
            .or_else(|| (paid_amount > Decimal::ZERO).then_some(call_date));

        let new_call = NewCapitalCall {
            allocation_id: allocation.id.clone(),
            call_amount: request.call_amount,
            amount_type: request.amount_type.unwrap_or(allocation.amount_type),
            call_date,
            due_date,
            status,
            paid_amount,
            paid_date,
            notes: request.notes,
        };
        let result = self.persist_call(new_call, &settings).await?;

        if result.is_new {
            info!(
                "Created capital call {} for allocation {} ({})",
                result.record.id,
                allocation.id,
                status.as_db_str()
            );
            self.event_sink.emit(DomainEvent::capital_calls_created(
                allocation.id.clone(),
                vec![result.record.id.clone()],
            ));
            if status.is_issued() && settings.auto_status_update {
                self.cascade_allocation_status(&allocation.id).await;
            }
        }
        Ok(result)
    }

    async fn generate_capital_calls(
        &self,
        request: GenerateScheduleRequest,
    ) -> Result<GeneratedSchedule> {
        let allocation = self.require_allocation(&request.allocation_id).await?;
        let settings = self.settings();

        let schedule_allocation = ScheduleAllocation {
            amount: allocation.amount,
            amount_type: allocation.amount_type,
            allocation_date: Some(allocation.allocation_date),
        };
        let new_calls = generate_schedule(&schedule_allocation, &request, settings.due_days)?;

        let mut capital_calls = Vec::with_capacity(new_calls.len());
        let mut created_ids = Vec::new();
        for new_call in new_calls {
            let result = self.persist_call(new_call, &settings).await?;
            if result.is_new {
                created_ids.push(result.record.id.clone());
            }
            capital_calls.push(result.into_inner());
        }

        let created_count = created_ids.len();
        let existing_count = capital_calls.len() - created_count;
        info!(
            "Generated {} capital calls for allocation {} ({} new, {} existing)",
            capital_calls.len(),
            allocation.id,
            created_count,
            existing_count
        );
        if !created_ids.is_empty() {
            self.event_sink.emit(DomainEvent::capital_calls_created(
                allocation.id.clone(),
                created_ids,
            ));
        }

        // A single schedule settles the allocation on the spot.
        let any_issued = capital_calls.iter().any(|call| call.status.is_issued());
        if request.schedule_type == ScheduleType::Single
            || (any_issued && settings.auto_status_update)
        {
            self.cascade_allocation_status(&allocation.id).await;
        }

        Ok(GeneratedSchedule {
            capital_calls,
            created_count,
            existing_count,
        })
    }

    async fn update_capital_call_status(
        &self,
        capital_call_id: &str,
        update: CapitalCallStatusUpdate,
    ) -> Result<CapitalCall> {
        debug!(
            "Updating capital call {} to {}",
            capital_call_id,
            update.status.as_db_str()
        );
        let settings = self.settings();
        let guard = self.locks.lock_capital_call(capital_call_id).await;

        let mut call = self.require_call(capital_call_id).await?;
        let previous_status = call.status;
        let resolution = resolve_status_update(&call, &update, today_utc())?;

        // The payment log must agree with the paid amount the status implies.
        let mut balancing_payment = None;
        if resolution.status == CapitalCallStatus::Paid || resolution.status.is_partial() {
            let payments = self
                .payment_repository
                .get_payments_by_capital_call(capital_call_id)
                .await?;
            let logged_total = summarize_payments(&payments).total_paid;
            if resolution.paid_amount < logged_total {
                return Err(CapitalCallError::InvalidPaidAmount {
                    status: update.status,
                    paid_amount: update.paid_amount,
                    call_amount: call.call_amount,
                }
                .into());
            }
            if resolution.paid_amount > logged_total {
                balancing_payment = Some(NewPayment {
                    capital_call_id: capital_call_id.to_string(),
                    amount: resolution.paid_amount - logged_total,
                    payment_date: resolution.paid_date.unwrap_or_else(today_utc),
                    payment_type: settings.default_payment_type,
                    notes: Some(STATUS_UPDATE_PAYMENT_NOTE.to_string()),
                    created_by: None,
                });
            }
        }

        let payment = match balancing_payment {
            Some(new_payment) => Some(self.payment_repository.create_payment(new_payment).await?),
            None => None,
        };

        resolution.apply_to(&mut call);
        call.updated_at = now_utc();
        let updated = self.capital_call_repository.update_capital_call(call).await?;
        drop(guard);

        info!(
            "Capital call {} status {} -> {}",
            updated.id,
            previous_status.as_db_str(),
            updated.status.as_db_str()
        );
        if let Some(payment) = payment {
            self.event_sink.emit(DomainEvent::payment_recorded(
                payment.capital_call_id,
                payment.id,
                payment.amount,
            ));
        }
        self.event_sink.emit(DomainEvent::capital_call_status_changed(
            updated.id.clone(),
            updated.allocation_id.clone(),
            previous_status,
            updated.status,
        ));

        if settings.auto_status_update {
            self.cascade_allocation_status(&updated.allocation_id).await;
        } else {
            warn!(
                "Automatic status update disabled; allocation {} not refreshed",
                updated.allocation_id
            );
        }
        Ok(updated)
    }

    async fn update_capital_call_dates(
        &self,
        capital_call_id: &str,
        update: CapitalCallDatesUpdate,
    ) -> Result<CapitalCall> {
        let settings = self.settings();
        let _guard = self.locks.lock_capital_call(capital_call_id).await;

        let mut call = self.require_call(capital_call_id).await?;
        if call.status == CapitalCallStatus::Paid {
            return Err(CapitalCallError::AlreadySettled {
                id: capital_call_id.to_string(),
            }
            .into());
        }

        let due_date = match update.due_date {
            Some(due_date) => due_date,
            None => Self::default_due_date(update.call_date, &settings)?,
        };
        FieldValidator::new()
            .require_not_before("dueDate", Some(due_date), "callDate", Some(update.call_date))
            .finish()?;

        call.call_date = update.call_date;
        call.due_date = due_date;
        call.updated_at = now_utc();
        let updated = self.capital_call_repository.update_capital_call(call).await?;
        info!(
            "Rescheduled capital call {} to {} (due {})",
            updated.id, updated.call_date, updated.due_date
        );
        Ok(updated)
    }

    async fn get_capital_call(&self, capital_call_id: &str) -> Result<CapitalCall> {
        self.require_call(capital_call_id).await
    }

    async fn get_capital_calls_by_allocation(
        &self,
        allocation_id: &str,
    ) -> Result<Vec<CapitalCall>> {
        self.capital_call_repository
            .get_capital_calls_by_allocation(allocation_id)
            .await
    }

    async fn mark_overdue_capital_calls(&self, as_of: NaiveDate) -> Result<Vec<CapitalCall>> {
        let settings = self.settings();
        let candidates = self
            .capital_call_repository
            .get_open_capital_calls_due_before(as_of)
            .await?;

        let overdue = CapitalCallStatusUpdate {
            status: CapitalCallStatus::Overdue,
            paid_amount: None,
            paid_date: None,
        };
        let mut marked = Vec::new();
        for candidate in candidates {
            let _guard = self.locks.lock_capital_call(&candidate.id).await;
            // Re-read under the lock; a payment may have landed meanwhile.
            let Some(mut call) = self
                .capital_call_repository
                .get_capital_call(&candidate.id)
                .await?
            else {
                continue;
            };
            if call.due_date >= as_of || !call.status.can_transition_to(CapitalCallStatus::Overdue)
            {
                continue;
            }

            let previous_status = call.status;
            resolve_status_update(&call, &overdue, as_of)?.apply_to(&mut call);
            call.updated_at = now_utc();
            let updated = self.capital_call_repository.update_capital_call(call).await?;
            self.event_sink.emit(DomainEvent::capital_call_status_changed(
                updated.id.clone(),
                updated.allocation_id.clone(),
                previous_status,
                updated.status,
            ));
            marked.push(updated);
        }

        info!("Marked {} capital calls overdue as of {}", marked.len(), as_of);
        if settings.auto_status_update {
            let allocation_ids: BTreeSet<&str> =
                marked.iter().map(|call| call.allocation_id.as_str()).collect();
            for allocation_id in allocation_ids {
                self.cascade_allocation_status(allocation_id).await;
            }
        }
        Ok(marked)
    }
}
