//! Payment domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::capital_calls::CapitalCall;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    #[default]
    Wire,
    Check,
    Ach,
    Other,
}

impl PaymentType {
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            PaymentType::Wire => "wire",
            PaymentType::Check => "check",
            PaymentType::Ach => "ach",
            PaymentType::Other => "other",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "wire" => Some(PaymentType::Wire),
            "check" => Some(PaymentType::Check),
            "ach" => Some(PaymentType::Ach),
            "other" => Some(PaymentType::Other),
            _ => None,
        }
    }
}

/// One recorded payment against a capital call. Payments are never updated
/// or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub capital_call_id: String,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_type: PaymentType,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Fully resolved payment handed to storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub capital_call_id: String,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_type: PaymentType,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

/// Caller input for recording a payment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    pub capital_call_id: String,
    pub amount: Decimal,
    /// Defaults to today.
    pub payment_date: Option<NaiveDate>,
    /// Defaults to the configured payment type.
    pub payment_type: Option<PaymentType>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

/// The appended payment together with the call it updated.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordedPayment {
    pub payment: Payment,
    pub capital_call: CapitalCall,
}
