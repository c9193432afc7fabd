//! Fund allocation domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::integrity::FieldValidator;
use crate::Result;

/// How an amount field is interpreted.
///
/// For `Dollar` the amount is a currency figure. For `Percentage` the amount
/// is a share of the commitment and capital calls store the percentage itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AmountType {
    Percentage,
    #[default]
    Dollar,
}

impl AmountType {
    /// Returns the database string representation.
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            AmountType::Percentage => "percentage",
            AmountType::Dollar => "dollar",
        }
    }

    /// Parses an amount type from its database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "percentage" => Some(AmountType::Percentage),
            "dollar" => Some(AmountType::Dollar),
            _ => None,
        }
    }
}

/// Funding lifecycle of an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStatus {
    #[default]
    Committed,
    Invested,
    Funded,
    PartiallyClosed,
    Closed,
    WrittenOff,
}

impl AllocationStatus {
    /// Returns the database string representation.
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            AllocationStatus::Committed => "committed",
            AllocationStatus::Invested => "invested",
            AllocationStatus::Funded => "funded",
            AllocationStatus::PartiallyClosed => "partially_closed",
            AllocationStatus::Closed => "closed",
            AllocationStatus::WrittenOff => "written_off",
        }
    }

    /// Parses an allocation status from its database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "committed" => Some(AllocationStatus::Committed),
            "invested" => Some(AllocationStatus::Invested),
            "funded" => Some(AllocationStatus::Funded),
            "partially_closed" => Some(AllocationStatus::PartiallyClosed),
            "closed" => Some(AllocationStatus::Closed),
            "written_off" => Some(AllocationStatus::WrittenOff),
            _ => None,
        }
    }

    /// Statuses the capital-call aggregator is allowed to overwrite.
    ///
    /// Exit statuses (closing, closed, written off) are set by the deal
    /// lifecycle and are never recomputed from calls.
    pub fn is_derived_from_calls(&self) -> bool {
        matches!(
            self,
            AllocationStatus::Committed | AllocationStatus::Invested | AllocationStatus::Funded
        )
    }
}

/// Committed capital from one fund into one deal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FundAllocation {
    pub id: String,
    pub fund_id: String,
    pub deal_id: String,
    pub amount: Decimal,
    pub amount_type: AmountType,
    pub allocation_date: NaiveDate,
    pub status: AllocationStatus,
    /// Share of the fund's funded capital, in percent. Written only by the
    /// portfolio weight recalculation.
    pub portfolio_weight: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new allocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFundAllocation {
    pub fund_id: String,
    pub deal_id: String,
    pub amount: Decimal,
    #[serde(default)]
    pub amount_type: AmountType,
    pub allocation_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<AllocationStatus>,
}

impl NewFundAllocation {
    /// Validates required fields, reporting every problem at once.
    pub fn validate(&self) -> Result<()> {
        let mut validator = FieldValidator::new();
        validator
            .require_text("fundId", &self.fund_id)
            .require_text("dealId", &self.deal_id)
            .require_positive("amount", self.amount)
            .require_present("allocationDate", &self.allocation_date);
        if self.amount_type == AmountType::Percentage {
            validator.check(
                self.amount <= crate::constants::FULL_COMMITMENT_PERCENTAGE,
                "amount",
                "percentage allocations cannot exceed 100",
            );
        }
        validator.finish()
    }
}

/// Roll-up of an allocation's capital calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationFundingSummary {
    pub allocation_id: String,
    pub fund_id: String,
    pub committed_amount: Decimal,
    pub amount_type: AmountType,
    /// Sum of call amounts for calls that have been issued (not `scheduled`).
    pub total_called: Decimal,
    /// Sum of paid amounts for calls in `paid` status.
    pub total_paid: Decimal,
    pub total_outstanding: Decimal,
    pub call_count: usize,
    pub issued_call_count: usize,
    pub paid_call_count: usize,
    pub current_status: AllocationStatus,
    pub derived_status: AllocationStatus,
}
