use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;

use super::portfolio_weights::{compute_portfolio_weights, AllocationWeight};
use super::{AllocationRepositoryTrait, PortfolioWeightServiceTrait};
use crate::events::{DomainEvent, DomainEventSink};
use crate::utils::KeyedMutex;
use crate::Result;

/// Recomputes fund-wide portfolio weights under the fund's lock.
pub struct PortfolioWeightService {
    allocation_repository: Arc<dyn AllocationRepositoryTrait>,
    locks: Arc<KeyedMutex>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl PortfolioWeightService {
    pub fn new(
        allocation_repository: Arc<dyn AllocationRepositoryTrait>,
        locks: Arc<KeyedMutex>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            allocation_repository,
            locks,
            event_sink,
        }
    }
}

#[async_trait]
impl PortfolioWeightServiceTrait for PortfolioWeightService {
    async fn recalculate_portfolio_weights(
        &self,
        fund_id: &str,
    ) -> Result<Option<Vec<AllocationWeight>>> {
        let _guard = self.locks.lock_fund(fund_id).await;

        let allocations = self
            .allocation_repository
            .get_allocations_by_fund(fund_id)
            .await?;

        let Some(weights) = compute_portfolio_weights(&allocations) else {
            warn!(
                "Fund {} has no funded capital; portfolio weights left unchanged",
                fund_id
            );
            return Ok(None);
        };

        let unchanged = allocations.len() == weights.len()
            && allocations
                .iter()
                .zip(&weights)
                .all(|(a, w)| a.portfolio_weight == w.portfolio_weight);
        if unchanged {
            debug!("Portfolio weights for fund {} already current", fund_id);
            return Ok(Some(weights));
        }

        let written = self
            .allocation_repository
            .update_portfolio_weights(fund_id, weights.clone())
            .await?;
        info!(
            "Recalculated portfolio weights for {} allocations in fund {}",
            written, fund_id
        );

        self.event_sink.emit(DomainEvent::portfolio_weights_recalculated(
            fund_id.to_string(),
            weights.iter().map(|w| w.allocation_id.clone()).collect(),
        ));
        Ok(Some(weights))
    }
}
