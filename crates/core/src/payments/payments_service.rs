use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::sync::Arc;

use super::ledger::{apply_payment, summarize_payments};
use super::{
    NewPayment, Payment, PaymentRepositoryTrait, PaymentServiceTrait, RecordPaymentRequest,
    RecordedPayment,
};
use crate::allocations::AllocationServiceTrait;
use crate::capital_calls::{CapitalCall, CapitalCallRepositoryTrait, CapitalCallStatus};
use crate::errors::Error;
use crate::events::{DomainEvent, DomainEventSink};
use crate::integrity::FieldValidator;
use crate::settings::{current_settings, SharedCapitalCallSettings};
use crate::utils::time_utils::{now_utc, today_utc};
use crate::utils::KeyedMutex;
use crate::Result;

/// Records payments and keeps each call's cached totals in step with its log.
pub struct PaymentService {
    capital_call_repository: Arc<dyn CapitalCallRepositoryTrait>,
    payment_repository: Arc<dyn PaymentRepositoryTrait>,
    allocation_service: Arc<dyn AllocationServiceTrait>,
    settings: SharedCapitalCallSettings,
    locks: Arc<KeyedMutex>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl PaymentService {
    pub fn new(
        capital_call_repository: Arc<dyn CapitalCallRepositoryTrait>,
        payment_repository: Arc<dyn PaymentRepositoryTrait>,
        allocation_service: Arc<dyn AllocationServiceTrait>,
        settings: SharedCapitalCallSettings,
        locks: Arc<KeyedMutex>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            capital_call_repository,
            payment_repository,
            allocation_service,
            settings,
            locks,
            event_sink,
        }
    }

    async fn require_call(&self, capital_call_id: &str) -> Result<CapitalCall> {
        self.capital_call_repository
            .get_capital_call(capital_call_id)
            .await?
            .ok_or_else(|| Error::not_found("Capital call", capital_call_id))
    }
}

#[async_trait]
impl PaymentServiceTrait for PaymentService {
    async fn record_payment(&self, request: RecordPaymentRequest) -> Result<RecordedPayment> {
        debug!(
            "Recording payment of {} against capital call {}",
            request.amount, request.capital_call_id
        );
        let settings = current_settings(&self.settings);

        let mut validator = FieldValidator::new();
        validator
            .require_text("capitalCallId", &request.capital_call_id)
            .require_positive("amount", request.amount);
        if settings.require_payment_notes {
            let has_notes = request
                .notes
                .as_deref()
                .is_some_and(|notes| !notes.trim().is_empty());
            validator.check(has_notes, "notes", "are required for payments");
        }
        validator.finish()?;

        let payment_date = request.payment_date.unwrap_or_else(today_utc);
        let payment_type = request
            .payment_type
            .unwrap_or(settings.default_payment_type);

        let guard = self.locks.lock_capital_call(&request.capital_call_id).await;
        let mut call = self.require_call(&request.capital_call_id).await?;

        let logged_total = summarize_payments(
            &self
                .payment_repository
                .get_payments_by_capital_call(&call.id)
                .await?,
        )
        .total_paid;
        let outcome = apply_payment(
            &call,
            logged_total,
            request.amount,
            payment_date,
            settings.allow_overpayments,
        )?;

        let payment = self
            .payment_repository
            .create_payment(NewPayment {
                capital_call_id: call.id.clone(),
                amount: request.amount,
                payment_date,
                payment_type,
                notes: request.notes,
                created_by: request.created_by,
            })
            .await?;

        let previous_status = call.status;
        outcome.apply_to(&mut call);
        call.updated_at = now_utc();
        // The payment row is already committed. The log stays authoritative, so
        // the cached totals are rebuilt from it by the next payment on this call.
        let capital_call = match self.capital_call_repository.update_capital_call(call).await {
            Ok(updated) => updated,
            Err(e) => {
                error!(
                    "Payment {} is recorded but capital call {} totals were not updated: {}",
                    payment.id, payment.capital_call_id, e
                );
                return Err(e);
            }
        };
        drop(guard);

        info!(
            "Recorded payment {} of {} against capital call {} (outstanding {})",
            payment.id, payment.amount, capital_call.id, capital_call.outstanding_amount
        );
        self.event_sink.emit(DomainEvent::payment_recorded(
            payment.capital_call_id.clone(),
            payment.id.clone(),
            payment.amount,
        ));
        if previous_status != capital_call.status {
            self.event_sink.emit(DomainEvent::capital_call_status_changed(
                capital_call.id.clone(),
                capital_call.allocation_id.clone(),
                previous_status,
                capital_call.status,
            ));
        }

        let newly_paid = capital_call.status == CapitalCallStatus::Paid
            && previous_status != CapitalCallStatus::Paid;
        if newly_paid {
            if settings.auto_status_update {
                if let Err(e) = self
                    .allocation_service
                    .refresh_allocation_status(&capital_call.allocation_id)
                    .await
                {
                    error!(
                        "Allocation status refresh after payment {} failed: {}",
                        payment.id, e
                    );
                }
            } else {
                warn!(
                    "Automatic status update disabled; allocation {} not refreshed",
                    capital_call.allocation_id
                );
            }
        }

        Ok(RecordedPayment {
            payment,
            capital_call,
        })
    }

    async fn get_payments(&self, capital_call_id: &str) -> Result<Vec<Payment>> {
        self.require_call(capital_call_id).await?;
        self.payment_repository
            .get_payments_by_capital_call(capital_call_id)
            .await
    }
}
