//! Portfolio weight computation for the allocations of one fund.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AllocationStatus, FundAllocation};
use crate::constants::{FULL_COMMITMENT_PERCENTAGE, WEIGHT_DECIMAL_PRECISION};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationWeight {
    pub allocation_id: String,
    pub portfolio_weight: Decimal,
}

/// Weight of each allocation as a percentage of the fund's funded capital.
///
/// Non-funded allocations get 0. Weights are rounded to two places and the
/// rounding residual goes to the largest funded allocation so funded weights
/// sum to exactly 100. Returns `None` when no capital is funded.
pub fn compute_portfolio_weights(allocations: &[FundAllocation]) -> Option<Vec<AllocationWeight>> {
    let is_funded = |a: &FundAllocation| a.status == AllocationStatus::Funded;
    let funded_capital: Decimal = allocations
        .iter()
        .filter(|a| is_funded(a))
        .map(|a| a.amount)
        .sum();
    if funded_capital <= Decimal::ZERO {
        return None;
    }

    let mut weights: Vec<AllocationWeight> = allocations
        .iter()
        .map(|a| AllocationWeight {
            allocation_id: a.id.clone(),
            portfolio_weight: if is_funded(a) {
                (a.amount / funded_capital * FULL_COMMITMENT_PERCENTAGE)
                    .round_dp(WEIGHT_DECIMAL_PRECISION)
            } else {
                Decimal::ZERO
            },
        })
        .collect();

    let assigned: Decimal = weights.iter().map(|w| w.portfolio_weight).sum();
    let residual = FULL_COMMITMENT_PERCENTAGE - assigned;
    if !residual.is_zero() {
        let largest = allocations
            .iter()
            .enumerate()
            .filter(|(_, a)| is_funded(a))
            .max_by(|(_, a), (_, b)| a.amount.cmp(&b.amount))
            .map(|(index, _)| index);
        if let Some(index) = largest {
            weights[index].portfolio_weight += residual;
        }
    }

    Some(weights)
}
