//! Domain event types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocations::AllocationStatus;
use crate::capital_calls::CapitalCallStatus;

/// Domain events emitted by core services after successful mutations.
///
/// These events are facts about data that already changed. Hosts translate
/// them into notifications, cache invalidation, or UI refreshes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A new allocation was persisted (not emitted for duplicate submissions).
    AllocationCreated {
        allocation_id: String,
        fund_id: String,
    },

    /// Capital calls were persisted for an allocation.
    CapitalCallsCreated {
        allocation_id: String,
        capital_call_ids: Vec<String>,
    },

    CapitalCallStatusChanged {
        capital_call_id: String,
        allocation_id: String,
        from: CapitalCallStatus,
        to: CapitalCallStatus,
    },

    /// A payment was appended to a call's ledger.
    PaymentRecorded {
        capital_call_id: String,
        payment_id: String,
        amount: Decimal,
    },

    AllocationStatusChanged {
        allocation_id: String,
        fund_id: String,
        old_status: AllocationStatus,
        new_status: AllocationStatus,
    },

    /// Portfolio weights were rewritten for every allocation in a fund.
    PortfolioWeightsRecalculated {
        fund_id: String,
        allocation_ids: Vec<String>,
    },
}

impl DomainEvent {
    pub fn allocation_created(allocation_id: String, fund_id: String) -> Self {
        Self::AllocationCreated {
            allocation_id,
            fund_id,
        }
    }

    pub fn capital_calls_created(allocation_id: String, capital_call_ids: Vec<String>) -> Self {
        Self::CapitalCallsCreated {
            allocation_id,
            capital_call_ids,
        }
    }

    pub fn capital_call_status_changed(
        capital_call_id: String,
        allocation_id: String,
        from: CapitalCallStatus,
        to: CapitalCallStatus,
    ) -> Self {
        Self::CapitalCallStatusChanged {
            capital_call_id,
            allocation_id,
            from,
            to,
        }
    }

    pub fn payment_recorded(capital_call_id: String, payment_id: String, amount: Decimal) -> Self {
        Self::PaymentRecorded {
            capital_call_id,
            payment_id,
            amount,
        }
    }

    pub fn allocation_status_changed(
        allocation_id: String,
        fund_id: String,
        old_status: AllocationStatus,
        new_status: AllocationStatus,
    ) -> Self {
        Self::AllocationStatusChanged {
            allocation_id,
            fund_id,
            old_status,
            new_status,
        }
    }

    pub fn portfolio_weights_recalculated(fund_id: String, allocation_ids: Vec<String>) -> Self {
        Self::PortfolioWeightsRecalculated {
            fund_id,
            allocation_ids,
        }
    }
}
