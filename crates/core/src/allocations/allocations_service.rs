use async_trait::async_trait;
use log::{debug, error, info};
use std::sync::Arc;

use super::funding_status::{derive_funding_status, summarize_calls};
use super::{
    AllocationFundingSummary, AllocationRepositoryTrait, AllocationServiceTrait,
    AllocationStatus, FundAllocation, NewFundAllocation, PortfolioWeightServiceTrait,
};
use crate::capital_calls::CapitalCallRepositoryTrait;
use crate::errors::{Error, ValidationError};
use crate::events::{DomainEvent, DomainEventSink};
use crate::funds::FundRepositoryTrait;
use crate::integrity::{create_or_get_existing, CreateResult};
use crate::utils::KeyedMutex;
use crate::Result;

/// Service for allocations and their funding status.
pub struct AllocationService {
    fund_repository: Arc<dyn FundRepositoryTrait>,
    allocation_repository: Arc<dyn AllocationRepositoryTrait>,
    capital_call_repository: Arc<dyn CapitalCallRepositoryTrait>,
    weight_service: Arc<dyn PortfolioWeightServiceTrait>,
    locks: Arc<KeyedMutex>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl AllocationService {
    pub fn new(
        fund_repository: Arc<dyn FundRepositoryTrait>,
        allocation_repository: Arc<dyn AllocationRepositoryTrait>,
        capital_call_repository: Arc<dyn CapitalCallRepositoryTrait>,
        weight_service: Arc<dyn PortfolioWeightServiceTrait>,
        locks: Arc<KeyedMutex>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            fund_repository,
            allocation_repository,
            capital_call_repository,
            weight_service,
            locks,
            event_sink,
        }
    }

    async fn require_allocation(&self, allocation_id: &str) -> Result<FundAllocation> {
        self.allocation_repository
            .get_allocation(allocation_id)
            .await?
            .ok_or_else(|| Error::not_found("Allocation", allocation_id))
    }

    /// Weight recalculation is a downstream effect; its failure is logged only.
    async fn cascade_weights(&self, fund_id: &str) {
        if let Err(e) = self
            .weight_service
            .recalculate_portfolio_weights(fund_id)
            .await
        {
            error!(
                "Portfolio weight recalculation for fund {} failed: {}",
                fund_id, e
            );
        }
    }
}

#[async_trait]
impl AllocationServiceTrait for AllocationService {
    async fn create_allocation(
        &self,
        new_allocation: NewFundAllocation,
    ) -> Result<CreateResult<FundAllocation>> {
        debug!(
            "Creating allocation of {} for fund {} into deal {}",
            new_allocation.amount, new_allocation.fund_id, new_allocation.deal_id
        );
        new_allocation.validate()?;

        if self
            .fund_repository
            .get_fund(&new_allocation.fund_id)
            .await?
            .is_none()
        {
            return Err(Error::not_found("Fund", new_allocation.fund_id.as_str()));
        }

        let allocation_date = new_allocation
            .allocation_date
            .ok_or_else(|| ValidationError::MissingField("allocationDate".to_string()))?;
        let fund_id = new_allocation.fund_id.clone();
        let deal_id = new_allocation.deal_id.clone();

        let result = create_or_get_existing(
            "allocation",
            self.allocation_repository.create_allocation(new_allocation),
            || {
                self.allocation_repository
                    .find_allocation(&fund_id, &deal_id, allocation_date)
            },
        )
        .await?;

        if result.is_new {
            let allocation = &result.record;
            info!(
                "Created allocation {} in fund {} with status {}",
                allocation.id,
                allocation.fund_id,
                allocation.status.as_db_str()
            );
            self.event_sink.emit(DomainEvent::allocation_created(
                allocation.id.clone(),
                allocation.fund_id.clone(),
            ));
            if allocation.status == AllocationStatus::Funded {
                self.cascade_weights(&allocation.fund_id).await;
            }
        }
        Ok(result)
    }

    async fn get_allocation(&self, allocation_id: &str) -> Result<FundAllocation> {
        self.require_allocation(allocation_id).await
    }

    async fn get_fund_allocations(&self, fund_id: &str) -> Result<Vec<FundAllocation>> {
        self.allocation_repository
            .get_allocations_by_fund(fund_id)
            .await
    }

    async fn refresh_allocation_status(&self, allocation_id: &str) -> Result<FundAllocation> {
        let _guard = self.locks.lock_allocation(allocation_id).await;

        let allocation = self.require_allocation(allocation_id).await?;
        if !allocation.status.is_derived_from_calls() {
            debug!(
                "Allocation {} is {}; status not derived from calls",
                allocation_id,
                allocation.status.as_db_str()
            );
            return Ok(allocation);
        }

        let calls = self
            .capital_call_repository
            .get_capital_calls_by_allocation(allocation_id)
            .await?;
        let derived = derive_funding_status(&summarize_calls(&calls));
        if derived == allocation.status {
            return Ok(allocation);
        }

        let old_status = allocation.status;
        let updated = self
            .allocation_repository
            .update_allocation_status(allocation_id, derived)
            .await?;
        info!(
            "Allocation {} status {} -> {}",
            allocation_id,
            old_status.as_db_str(),
            derived.as_db_str()
        );
        self.event_sink.emit(DomainEvent::allocation_status_changed(
            updated.id.clone(),
            updated.fund_id.clone(),
            old_status,
            derived,
        ));

        if derived == AllocationStatus::Funded || old_status == AllocationStatus::Funded {
            self.cascade_weights(&updated.fund_id).await;
        }
        Ok(updated)
    }

    async fn get_funding_summary(&self, allocation_id: &str) -> Result<AllocationFundingSummary> {
        let allocation = self.require_allocation(allocation_id).await?;
        let calls = self
            .capital_call_repository
            .get_capital_calls_by_allocation(allocation_id)
            .await?;
        let totals = summarize_calls(&calls);
        let derived_status = if allocation.status.is_derived_from_calls() {
            derive_funding_status(&totals)
        } else {
            allocation.status
        };

        Ok(AllocationFundingSummary {
            allocation_id: allocation.id,
            fund_id: allocation.fund_id,
            committed_amount: allocation.amount,
            amount_type: allocation.amount_type,
            total_called: totals.total_called,
            total_paid: totals.total_paid,
            total_outstanding: totals.total_outstanding,
            call_count: totals.call_count,
            issued_call_count: totals.issued_call_count,
            paid_call_count: totals.paid_call_count,
            current_status: allocation.status,
            derived_status,
        })
    }
}
