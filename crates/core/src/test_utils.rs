//! In-memory repositories and a wired service graph for service tests.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::allocations::{
    AllocationRepositoryTrait, AllocationService, AllocationServiceTrait, AllocationStatus,
    AllocationWeight, AmountType, FundAllocation, NewFundAllocation, PortfolioWeightService,
};
use crate::capital_calls::{
    CapitalCall, CapitalCallRepositoryTrait, CapitalCallService, CapitalCallStatus,
    NewCapitalCall,
};
use crate::errors::{DatabaseError, Error, Result};
use crate::events::MockDomainEventSink;
use crate::funds::{Fund, FundRepositoryTrait, FundService, NewFund};
use crate::payments::{NewPayment, Payment, PaymentRepositoryTrait, PaymentService};
use crate::settings::{CapitalCallSettings, SharedCapitalCallSettings};
use crate::utils::KeyedMutex;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn timestamp() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

/// Mirrors the storage contract: unique keys raise `UniqueViolation`.
#[derive(Default)]
pub struct InMemoryStore {
    funds: Mutex<Vec<Fund>>,
    allocations: Mutex<Vec<FundAllocation>>,
    capital_calls: Mutex<Vec<CapitalCall>>,
    payments: Mutex<Vec<Payment>>,
    next_id: AtomicUsize,
    pub fail_weight_updates: AtomicBool,
    pub fail_call_updates: AtomicBool,
    /// Hands control back to the runtime after each read that precedes a
    /// write, so concurrent tasks interleave between the two.
    pub yield_after_reads: AtomicBool,
    pub allocation_creates: AtomicUsize,
}

impl InMemoryStore {
    async fn pause(&self) {
        if self.yield_after_reads.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn allocation(&self, id: &str) -> FundAllocation {
        self.allocations
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .unwrap()
    }

    pub fn capital_call(&self, id: &str) -> CapitalCall {
        self.capital_calls
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .unwrap()
    }

    pub fn payments_for(&self, capital_call_id: &str) -> Vec<Payment> {
        self.payments
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.capital_call_id == capital_call_id)
            .cloned()
            .collect()
    }

    pub fn allocation_count(&self) -> usize {
        self.allocations.lock().unwrap().len()
    }

    /// Overwrites an allocation's status without going through the services.
    pub fn force_allocation_status(&self, id: &str, status: AllocationStatus) {
        let mut allocations = self.allocations.lock().unwrap();
        if let Some(allocation) = allocations.iter_mut().find(|a| a.id == id) {
            allocation.status = status;
        }
    }
}

#[async_trait]
impl FundRepositoryTrait for InMemoryStore {
    async fn get_fund(&self, fund_id: &str) -> Result<Option<Fund>> {
        Ok(self
            .funds
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id == fund_id)
            .cloned())
    }

    async fn list_funds(&self) -> Result<Vec<Fund>> {
        Ok(self.funds.lock().unwrap().clone())
    }

    async fn create_fund(&self, new_fund: NewFund) -> Result<Fund> {
        let now = timestamp();
        let fund = Fund {
            id: new_fund.id.unwrap_or_else(|| self.next_id("fund")),
            name: new_fund.name,
            vintage_year: new_fund.vintage_year,
            currency: new_fund.currency.unwrap_or_else(|| "USD".to_string()),
            created_at: now,
            updated_at: now,
        };
        let mut funds = self.funds.lock().unwrap();
        if funds.iter().any(|f| f.id == fund.id) {
            return Err(DatabaseError::UniqueViolation(fund.id).into());
        }
        funds.push(fund.clone());
        Ok(fund)
    }
}

#[async_trait]
impl AllocationRepositoryTrait for InMemoryStore {
    async fn get_allocation(&self, allocation_id: &str) -> Result<Option<FundAllocation>> {
        Ok(self
            .allocations
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == allocation_id)
            .cloned())
    }

    async fn get_allocations_by_fund(&self, fund_id: &str) -> Result<Vec<FundAllocation>> {
        let allocations: Vec<FundAllocation> = self
            .allocations
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.fund_id == fund_id)
            .cloned()
            .collect();
        self.pause().await;
        Ok(allocations)
    }

    async fn find_allocation(
        &self,
        fund_id: &str,
        deal_id: &str,
        allocation_date: NaiveDate,
    ) -> Result<Option<FundAllocation>> {
        Ok(self
            .allocations
            .lock()
            .unwrap()
            .iter()
            .find(|a| {
                a.fund_id == fund_id && a.deal_id == deal_id && a.allocation_date == allocation_date
            })
            .cloned())
    }

    async fn create_allocation(&self, new_allocation: NewFundAllocation) -> Result<FundAllocation> {
        self.allocation_creates.fetch_add(1, Ordering::SeqCst);
        let allocation_date = new_allocation
            .allocation_date
            .ok_or_else(|| Error::Unexpected("allocation date missing".to_string()))?;
        let mut allocations = self.allocations.lock().unwrap();
        if allocations.iter().any(|a| {
            a.fund_id == new_allocation.fund_id
                && a.deal_id == new_allocation.deal_id
                && a.allocation_date == allocation_date
        }) {
            return Err(DatabaseError::UniqueViolation(
                "fund_allocations.fund_id, deal_id, allocation_date".to_string(),
            )
            .into());
        }
        let now = timestamp();
        let allocation = FundAllocation {
            id: self.next_id("alloc"),
            fund_id: new_allocation.fund_id,
            deal_id: new_allocation.deal_id,
            amount: new_allocation.amount,
            amount_type: new_allocation.amount_type,
            allocation_date,
            status: new_allocation.status.unwrap_or_default(),
            portfolio_weight: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        };
        allocations.push(allocation.clone());
        Ok(allocation)
    }

    async fn update_allocation_status(
        &self,
        allocation_id: &str,
        status: AllocationStatus,
    ) -> Result<FundAllocation> {
        let mut allocations = self.allocations.lock().unwrap();
        let allocation = allocations
            .iter_mut()
            .find(|a| a.id == allocation_id)
            .ok_or_else(|| DatabaseError::NotFound(allocation_id.to_string()))?;
        allocation.status = status;
        allocation.updated_at = timestamp();
        Ok(allocation.clone())
    }

    async fn update_portfolio_weights(
        &self,
        fund_id: &str,
        weights: Vec<AllocationWeight>,
    ) -> Result<usize> {
        if self.fail_weight_updates.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryFailed("weights unavailable".to_string()).into());
        }
        let mut allocations = self.allocations.lock().unwrap();
        let mut written = 0;
        for weight in weights {
            if let Some(allocation) = allocations
                .iter_mut()
                .find(|a| a.id == weight.allocation_id && a.fund_id == fund_id)
            {
                allocation.portfolio_weight = weight.portfolio_weight;
                written += 1;
            }
        }
        Ok(written)
    }
}

#[async_trait]
impl CapitalCallRepositoryTrait for InMemoryStore {
    async fn get_capital_call(&self, capital_call_id: &str) -> Result<Option<CapitalCall>> {
        let call = self
            .capital_calls
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == capital_call_id)
            .cloned();
        self.pause().await;
        Ok(call)
    }

    async fn get_capital_calls_by_allocation(
        &self,
        allocation_id: &str,
    ) -> Result<Vec<CapitalCall>> {
        let mut calls: Vec<CapitalCall> = self
            .capital_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.allocation_id == allocation_id)
            .cloned()
            .collect();
        calls.sort_by_key(|c| c.call_date);
        Ok(calls)
    }

    async fn find_capital_call(
        &self,
        allocation_id: &str,
        call_date: NaiveDate,
    ) -> Result<Option<CapitalCall>> {
        Ok(self
            .capital_calls
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.allocation_id == allocation_id && c.call_date == call_date)
            .cloned())
    }

    async fn create_capital_call(&self, new_call: NewCapitalCall) -> Result<CapitalCall> {
        let mut calls = self.capital_calls.lock().unwrap();
        if calls
            .iter()
            .any(|c| c.allocation_id == new_call.allocation_id && c.call_date == new_call.call_date)
        {
            return Err(DatabaseError::UniqueViolation(
                "capital_calls.allocation_id, call_date".to_string(),
            )
            .into());
        }
        let now = timestamp();
        let outstanding_amount = new_call.outstanding_amount();
        let call = CapitalCall {
            id: self.next_id("call"),
            allocation_id: new_call.allocation_id,
            call_amount: new_call.call_amount,
            amount_type: new_call.amount_type,
            call_date: new_call.call_date,
            due_date: new_call.due_date,
            status: new_call.status,
            paid_amount: new_call.paid_amount,
            outstanding_amount,
            paid_date: new_call.paid_date,
            notes: new_call.notes,
            created_at: now,
            updated_at: now,
        };
        calls.push(call.clone());
        Ok(call)
    }

    async fn update_capital_call(&self, call: CapitalCall) -> Result<CapitalCall> {
        if self.fail_call_updates.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryFailed("calls unavailable".to_string()).into());
        }
        let mut calls = self.capital_calls.lock().unwrap();
        let clashes = calls.iter().any(|c| {
            c.id != call.id
                && c.allocation_id == call.allocation_id
                && c.call_date == call.call_date
        });
        if clashes {
            return Err(DatabaseError::UniqueViolation(
                "capital_calls.allocation_id, call_date".to_string(),
            )
            .into());
        }
        let existing = calls
            .iter_mut()
            .find(|c| c.id == call.id)
            .ok_or_else(|| DatabaseError::NotFound(call.id.clone()))?;
        *existing = call.clone();
        Ok(call)
    }

    async fn get_open_capital_calls_due_before(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<CapitalCall>> {
        let mut calls: Vec<CapitalCall> = self
            .capital_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| {
                c.due_date < date
                    && matches!(
                        c.status,
                        CapitalCallStatus::Scheduled
                            | CapitalCallStatus::Called
                            | CapitalCallStatus::Partial
                            | CapitalCallStatus::PartiallyPaid
                    )
            })
            .cloned()
            .collect();
        calls.sort_by_key(|c| c.due_date);
        Ok(calls)
    }
}

#[async_trait]
impl PaymentRepositoryTrait for InMemoryStore {
    async fn get_payments_by_capital_call(&self, capital_call_id: &str) -> Result<Vec<Payment>> {
        let mut payments = self.payments_for(capital_call_id);
        payments.sort_by_key(|p| p.payment_date);
        self.pause().await;
        Ok(payments)
    }

    async fn create_payment(&self, new_payment: NewPayment) -> Result<Payment> {
        let payment = Payment {
            id: self.next_id("pay"),
            capital_call_id: new_payment.capital_call_id,
            amount: new_payment.amount,
            payment_date: new_payment.payment_date,
            payment_type: new_payment.payment_type,
            notes: new_payment.notes,
            created_by: new_payment.created_by,
            created_at: timestamp(),
        };
        self.payments.lock().unwrap().push(payment.clone());
        Ok(payment)
    }
}

/// Every service wired to one in-memory store.
pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub events: MockDomainEventSink,
    pub settings: SharedCapitalCallSettings,
    pub funds: FundService,
    pub allocations: Arc<AllocationService>,
    pub weights: Arc<PortfolioWeightService>,
    pub capital_calls: CapitalCallService,
    pub payments: PaymentService,
    pub locks: Arc<KeyedMutex>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_settings(CapitalCallSettings::default())
    }

    pub fn with_settings(settings: CapitalCallSettings) -> Self {
        let store = Arc::new(InMemoryStore::default());
        let events = MockDomainEventSink::new();
        let sink = Arc::new(events.clone());
        let settings = settings.shared();
        let locks = Arc::new(KeyedMutex::new());

        let weights = Arc::new(PortfolioWeightService::new(
            store.clone(),
            locks.clone(),
            sink.clone(),
        ));
        let allocations = Arc::new(AllocationService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            weights.clone(),
            locks.clone(),
            sink.clone(),
        ));
        let allocation_service: Arc<dyn AllocationServiceTrait> = allocations.clone();
        let capital_calls = CapitalCallService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            allocation_service.clone(),
            settings.clone(),
            locks.clone(),
            sink.clone(),
        );
        let payments = PaymentService::new(
            store.clone(),
            store.clone(),
            allocation_service,
            settings.clone(),
            locks.clone(),
            sink,
        );

        Self {
            funds: FundService::new(store.clone()),
            store,
            events,
            settings,
            allocations,
            weights,
            capital_calls,
            payments,
            locks,
        }
    }

    pub async fn fund(&self, id: &str) -> Fund {
        self.store
            .create_fund(NewFund {
                id: Some(id.to_string()),
                name: format!("Fund {}", id),
                vintage_year: Some(2024),
                currency: None,
            })
            .await
            .unwrap()
    }

    pub async fn allocation(
        &self,
        fund_id: &str,
        deal_id: &str,
        amount: Decimal,
    ) -> FundAllocation {
        self.allocations
            .create_allocation(NewFundAllocation {
                fund_id: fund_id.to_string(),
                deal_id: deal_id.to_string(),
                amount,
                amount_type: AmountType::Dollar,
                allocation_date: Some(date(2024, 1, 15)),
                status: None,
            })
            .await
            .unwrap()
            .record
    }
}
