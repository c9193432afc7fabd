#[cfg(test)]
mod tests {
    use crate::allocations::AllocationStatus;
    use crate::capital_calls::{
        CapitalCallDatesUpdate, CapitalCallError, CapitalCallServiceTrait, CapitalCallStatus,
        CapitalCallStatusUpdate, CreateCapitalCallRequest, GenerateScheduleRequest,
        ScheduleType,
    };
    use crate::constants::{OPENING_PAYMENT_NOTE, STATUS_UPDATE_PAYMENT_NOTE};
    use crate::errors::{Error, ValidationError};
    use crate::events::DomainEvent;
    use crate::payments::{PaymentServiceTrait, RecordPaymentRequest};
    use crate::settings::CapitalCallSettings;
    use crate::test_utils::{date, TestContext};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn schedule(
        allocation_id: &str,
        schedule_type: ScheduleType,
        count: Option<u32>,
    ) -> GenerateScheduleRequest {
        GenerateScheduleRequest {
            allocation_id: allocation_id.to_string(),
            schedule_type,
            call_count: count,
            call_percentage: None,
            first_call_date: None,
            custom_schedule: Vec::new(),
            notes: None,
        }
    }

    fn to_status(
        status: CapitalCallStatus,
        paid_amount: Option<Decimal>,
    ) -> CapitalCallStatusUpdate {
        CapitalCallStatusUpdate {
            status,
            paid_amount,
            paid_date: None,
        }
    }

    fn direct_call(
        allocation_id: &str,
        amount: Decimal,
        call_date: chrono::NaiveDate,
    ) -> CreateCapitalCallRequest {
        CreateCapitalCallRequest {
            allocation_id: allocation_id.to_string(),
            call_amount: amount,
            call_date: Some(call_date),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_quarterly_schedule_paid_in_full_funds_allocation() {
        let ctx = TestContext::new();
        ctx.fund("fund-1").await;
        let allocation = ctx.allocation("fund-1", "deal-1", dec!(100000)).await;

        let generated = ctx
            .capital_calls
            .generate_capital_calls(schedule(&allocation.id, ScheduleType::Quarterly, Some(4)))
            .await
            .unwrap();
        assert_eq!(generated.created_count, 4);
        let total: Decimal = generated.capital_calls.iter().map(|c| c.call_amount).sum();
        assert_eq!(total, dec!(100000));

        let first = &generated.capital_calls[0];
        ctx.capital_calls
            .update_capital_call_status(&first.id, to_status(CapitalCallStatus::Called, None))
            .await
            .unwrap();

        for call in &generated.capital_calls {
            let updated = ctx
                .capital_calls
                .update_capital_call_status(
                    &call.id,
                    to_status(CapitalCallStatus::Paid, Some(call.call_amount)),
                )
                .await
                .unwrap();
            assert_eq!(updated.outstanding_amount, dec!(0));

            let payments = ctx.store.payments_for(&call.id);
            assert_eq!(payments.len(), 1);
            assert_eq!(payments[0].amount, call.call_amount);
            assert_eq!(payments[0].notes.as_deref(), Some(STATUS_UPDATE_PAYMENT_NOTE));
        }

        let allocation = ctx.store.allocation(&allocation.id);
        assert_eq!(allocation.status, AllocationStatus::Funded);
        assert_eq!(allocation.portfolio_weight, dec!(100.00));
    }

    #[tokio::test]
    async fn test_single_schedule_settles_immediately() {
        let ctx = TestContext::new();
        ctx.fund("fund-1").await;
        let allocation = ctx.allocation("fund-1", "deal-1", dec!(10000)).await;

        let generated = ctx
            .capital_calls
            .generate_capital_calls(schedule(&allocation.id, ScheduleType::Single, None))
            .await
            .unwrap();

        assert_eq!(generated.capital_calls.len(), 1);
        let call = &generated.capital_calls[0];
        assert_eq!(call.status, CapitalCallStatus::Paid);
        assert_eq!(call.paid_amount, dec!(10000));
        assert_eq!(call.call_date, allocation.allocation_date);

        let payments = ctx.store.payments_for(&call.id);
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].notes.as_deref(), Some(OPENING_PAYMENT_NOTE));

        let allocation = ctx.store.allocation(&allocation.id);
        assert_eq!(allocation.status, AllocationStatus::Funded);
        assert_eq!(allocation.portfolio_weight, dec!(100));
    }

    #[tokio::test]
    async fn test_single_schedule_funds_even_without_auto_update() {
        let ctx = TestContext::with_settings(CapitalCallSettings {
            auto_status_update: false,
            ..CapitalCallSettings::default()
        });
        ctx.fund("fund-1").await;
        let allocation = ctx.allocation("fund-1", "deal-1", dec!(10000)).await;

        ctx.capital_calls
            .generate_capital_calls(schedule(&allocation.id, ScheduleType::Single, None))
            .await
            .unwrap();

        assert_eq!(
            ctx.store.allocation(&allocation.id).status,
            AllocationStatus::Funded
        );
    }

    #[tokio::test]
    async fn test_regenerating_a_schedule_is_idempotent() {
        let ctx = TestContext::new();
        ctx.fund("fund-1").await;
        let allocation = ctx.allocation("fund-1", "deal-1", dec!(1000)).await;
        let request = schedule(&allocation.id, ScheduleType::Monthly, Some(3));

        let first = ctx
            .capital_calls
            .generate_capital_calls(request.clone())
            .await
            .unwrap();
        let second = ctx
            .capital_calls
            .generate_capital_calls(request)
            .await
            .unwrap();

        assert_eq!(second.created_count, 0);
        assert_eq!(second.existing_count, 3);
        let first_ids: Vec<_> = first.capital_calls.iter().map(|c| &c.id).collect();
        let second_ids: Vec<_> = second.capital_calls.iter().map(|c| &c.id).collect();
        assert_eq!(first_ids, second_ids);

        assert_eq!(
            ctx.events
                .count_where(|e| matches!(e, DomainEvent::CapitalCallsCreated { .. })),
            1
        );
    }

    #[tokio::test]
    async fn test_direct_create_returns_existing_on_duplicate() {
        let ctx = TestContext::new();
        ctx.fund("fund-1").await;
        let allocation = ctx.allocation("fund-1", "deal-1", dec!(1000)).await;

        let request = direct_call(&allocation.id, dec!(250), date(2024, 3, 1));
        let first = ctx
            .capital_calls
            .create_capital_call(request.clone())
            .await
            .unwrap();
        let second = ctx.capital_calls.create_capital_call(request).await.unwrap();

        assert!(first.is_new);
        assert!(!second.is_new);
        assert_eq!(second.record.id, first.record.id);
        assert_eq!(first.record.due_date, date(2024, 3, 15));
        assert_eq!(first.record.outstanding_amount, dec!(250));
    }

    #[tokio::test]
    async fn test_direct_create_validates_input() {
        let ctx = TestContext::new();
        ctx.fund("fund-1").await;
        let allocation = ctx.allocation("fund-1", "deal-1", dec!(1000)).await;

        let mut request = direct_call(&allocation.id, dec!(0), date(2024, 3, 1));
        request.due_date = Some(date(2024, 2, 1));
        request.paid_amount = Some(dec!(5));
        let err = ctx.capital_calls.create_capital_call(request).await.unwrap_err();
        let fields: Vec<String> = match err {
            Error::Validation(ValidationError::Fields(errors)) => {
                errors.into_iter().map(|e| e.field).collect()
            }
            other => panic!("expected field errors, got {:?}", other),
        };
        assert_eq!(fields, vec!["callAmount", "dueDate", "paidAmount"]);

        let missing = ctx
            .capital_calls
            .create_capital_call(direct_call("nope", dec!(10), date(2024, 3, 1)))
            .await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_direct_paid_call_seeds_ledger_and_funds() {
        let ctx = TestContext::new();
        ctx.fund("fund-1").await;
        let allocation = ctx.allocation("fund-1", "deal-1", dec!(1000)).await;

        let mut request = direct_call(&allocation.id, dec!(1000), date(2024, 3, 1));
        request.status = Some(CapitalCallStatus::Paid);
        let created = ctx.capital_calls.create_capital_call(request).await.unwrap();

        assert_eq!(created.record.paid_amount, dec!(1000));
        assert_eq!(created.record.paid_date, Some(date(2024, 3, 1)));
        assert_eq!(ctx.store.payments_for(&created.record.id).len(), 1);
        assert_eq!(
            ctx.store.allocation(&allocation.id).status,
            AllocationStatus::Funded
        );
    }

    #[tokio::test]
    async fn test_invalid_transition_leaves_call_unchanged() {
        let ctx = TestContext::new();
        ctx.fund("fund-1").await;
        let allocation = ctx.allocation("fund-1", "deal-1", dec!(1000)).await;
        let call = ctx
            .capital_calls
            .create_capital_call(direct_call(&allocation.id, dec!(500), date(2024, 3, 1)))
            .await
            .unwrap()
            .record;

        let err = ctx
            .capital_calls
            .update_capital_call_status(
                &call.id,
                to_status(CapitalCallStatus::Partial, Some(dec!(100))),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::CapitalCall(CapitalCallError::InvalidTransition {
                current: CapitalCallStatus::Scheduled,
                requested: CapitalCallStatus::Partial,
            })
        ));
        assert_eq!(ctx.store.capital_call(&call.id), call);
        assert!(ctx.store.payments_for(&call.id).is_empty());
    }

    #[tokio::test]
    async fn test_paid_status_requires_full_amount() {
        let ctx = TestContext::new();
        ctx.fund("fund-1").await;
        let allocation = ctx.allocation("fund-1", "deal-1", dec!(1000)).await;
        let call = ctx
            .capital_calls
            .create_capital_call(direct_call(&allocation.id, dec!(500), date(2024, 3, 1)))
            .await
            .unwrap()
            .record;

        let err = ctx
            .capital_calls
            .update_capital_call_status(
                &call.id,
                to_status(CapitalCallStatus::Paid, Some(dec!(499))),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::CapitalCall(CapitalCallError::InvalidPaidAmount { .. })
        ));
        assert_eq!(ctx.store.capital_call(&call.id).status, CapitalCallStatus::Scheduled);
    }

    #[tokio::test]
    async fn test_status_amount_below_logged_payments_is_rejected() {
        let ctx = TestContext::new();
        ctx.fund("fund-1").await;
        let allocation = ctx.allocation("fund-1", "deal-1", dec!(100000)).await;
        let call = ctx
            .capital_calls
            .create_capital_call(direct_call(&allocation.id, dec!(50000), date(2024, 3, 1)))
            .await
            .unwrap()
            .record;
        ctx.capital_calls
            .update_capital_call_status(&call.id, to_status(CapitalCallStatus::Called, None))
            .await
            .unwrap();
        ctx.payments
            .record_payment(RecordPaymentRequest {
                capital_call_id: call.id.clone(),
                amount: dec!(30000),
                payment_date: Some(date(2024, 3, 5)),
                ..Default::default()
            })
            .await
            .unwrap();

        // partially_paid -> overdue -> partial is a legal path; the amount is not.
        ctx.capital_calls
            .update_capital_call_status(&call.id, to_status(CapitalCallStatus::Overdue, None))
            .await
            .unwrap();
        let err = ctx
            .capital_calls
            .update_capital_call_status(
                &call.id,
                to_status(CapitalCallStatus::Partial, Some(dec!(20000))),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::CapitalCall(CapitalCallError::InvalidPaidAmount { .. })
        ));

        let updated = ctx
            .capital_calls
            .update_capital_call_status(
                &call.id,
                to_status(CapitalCallStatus::Partial, Some(dec!(40000))),
            )
            .await
            .unwrap();
        assert_eq!(updated.outstanding_amount, dec!(10000));
        let logged: Decimal = ctx.store.payments_for(&call.id).iter().map(|p| p.amount).sum();
        assert_eq!(logged, dec!(40000));
    }

    #[tokio::test]
    async fn test_default_writes_off_balance() {
        let ctx = TestContext::new();
        ctx.fund("fund-1").await;
        let allocation = ctx.allocation("fund-1", "deal-1", dec!(1000)).await;
        let call = ctx
            .capital_calls
            .create_capital_call(direct_call(&allocation.id, dec!(500), date(2024, 3, 1)))
            .await
            .unwrap()
            .record;

        let defaulted = ctx
            .capital_calls
            .update_capital_call_status(&call.id, to_status(CapitalCallStatus::Defaulted, None))
            .await
            .unwrap();
        assert_eq!(defaulted.outstanding_amount, dec!(0));
        assert_eq!(defaulted.paid_amount, dec!(0));
        assert_eq!(
            ctx.store.allocation(&allocation.id).status,
            AllocationStatus::Committed
        );
    }

    #[tokio::test]
    async fn test_reschedule_rules() {
        let ctx = TestContext::new();
        ctx.fund("fund-1").await;
        let allocation = ctx.allocation("fund-1", "deal-1", dec!(1000)).await;
        let call = ctx
            .capital_calls
            .create_capital_call(direct_call(&allocation.id, dec!(500), date(2024, 3, 1)))
            .await
            .unwrap()
            .record;

        let moved = ctx
            .capital_calls
            .update_capital_call_dates(
                &call.id,
                CapitalCallDatesUpdate {
                    call_date: date(2024, 4, 1),
                    due_date: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.call_date, date(2024, 4, 1));
        assert_eq!(moved.due_date, date(2024, 4, 15));

        let backwards = ctx
            .capital_calls
            .update_capital_call_dates(
                &call.id,
                CapitalCallDatesUpdate {
                    call_date: date(2024, 4, 1),
                    due_date: Some(date(2024, 3, 1)),
                },
            )
            .await;
        assert!(matches!(backwards, Err(Error::Validation(_))));

        ctx.capital_calls
            .update_capital_call_status(
                &call.id,
                to_status(CapitalCallStatus::Paid, Some(dec!(500))),
            )
            .await
            .unwrap();
        let settled = ctx
            .capital_calls
            .update_capital_call_dates(
                &call.id,
                CapitalCallDatesUpdate {
                    call_date: date(2024, 5, 1),
                    due_date: None,
                },
            )
            .await;
        assert!(matches!(
            settled,
            Err(Error::CapitalCall(CapitalCallError::AlreadySettled { .. }))
        ));
    }

    #[tokio::test]
    async fn test_mark_overdue_sweeps_unsettled_calls_once() {
        let ctx = TestContext::new();
        ctx.fund("fund-1").await;
        let allocation = ctx.allocation("fund-1", "deal-1", dec!(3000)).await;

        let late = ctx
            .capital_calls
            .create_capital_call(direct_call(&allocation.id, dec!(1000), date(2024, 2, 1)))
            .await
            .unwrap()
            .record;
        let mut paid_request = direct_call(&allocation.id, dec!(1000), date(2024, 2, 2));
        paid_request.status = Some(CapitalCallStatus::Paid);
        let paid = ctx
            .capital_calls
            .create_capital_call(paid_request)
            .await
            .unwrap()
            .record;
        let future = ctx
            .capital_calls
            .create_capital_call(direct_call(&allocation.id, dec!(1000), date(2024, 6, 1)))
            .await
            .unwrap()
            .record;

        let marked = ctx
            .capital_calls
            .mark_overdue_capital_calls(date(2024, 3, 1))
            .await
            .unwrap();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].id, late.id);
        assert_eq!(ctx.store.capital_call(&late.id).status, CapitalCallStatus::Overdue);
        assert_eq!(ctx.store.capital_call(&paid.id).status, CapitalCallStatus::Paid);
        assert_eq!(ctx.store.capital_call(&future.id).status, CapitalCallStatus::Scheduled);

        let again = ctx
            .capital_calls
            .mark_overdue_capital_calls(date(2024, 3, 1))
            .await
            .unwrap();
        assert!(again.is_empty());
        // The overdue call now counts as called but unpaid.
        assert_eq!(
            ctx.store.allocation(&allocation.id).status,
            AllocationStatus::Committed
        );
    }

    #[tokio::test]
    async fn test_auto_status_update_off_skips_aggregation() {
        let ctx = TestContext::with_settings(CapitalCallSettings {
            auto_status_update: false,
            ..CapitalCallSettings::default()
        });
        ctx.fund("fund-1").await;
        let allocation = ctx.allocation("fund-1", "deal-1", dec!(500)).await;
        let call = ctx
            .capital_calls
            .create_capital_call(direct_call(&allocation.id, dec!(500), date(2024, 3, 1)))
            .await
            .unwrap()
            .record;

        ctx.capital_calls
            .update_capital_call_status(
                &call.id,
                to_status(CapitalCallStatus::Paid, Some(dec!(500))),
            )
            .await
            .unwrap();

        assert_eq!(
            ctx.store.allocation(&allocation.id).status,
            AllocationStatus::Committed
        );
    }

    #[tokio::test]
    async fn test_status_change_emits_event() {
        let ctx = TestContext::new();
        ctx.fund("fund-1").await;
        let allocation = ctx.allocation("fund-1", "deal-1", dec!(500)).await;
        let call = ctx
            .capital_calls
            .create_capital_call(direct_call(&allocation.id, dec!(500), date(2024, 3, 1)))
            .await
            .unwrap()
            .record;
        ctx.events.clear();

        ctx.capital_calls
            .update_capital_call_status(&call.id, to_status(CapitalCallStatus::Called, None))
            .await
            .unwrap();

        assert_eq!(
            ctx.events.events(),
            vec![DomainEvent::capital_call_status_changed(
                call.id.clone(),
                allocation.id.clone(),
                CapitalCallStatus::Scheduled,
                CapitalCallStatus::Called,
            )]
        );
    }
}
