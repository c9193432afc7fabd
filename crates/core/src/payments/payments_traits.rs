use async_trait::async_trait;

use crate::errors::Result;
use crate::payments::payments_model::{NewPayment, Payment, RecordPaymentRequest, RecordedPayment};

/// Append-only payment log storage.
#[async_trait]
pub trait PaymentRepositoryTrait: Send + Sync {
    /// Payments for one call, ordered by payment date then creation time.
    async fn get_payments_by_capital_call(&self, capital_call_id: &str) -> Result<Vec<Payment>>;
    async fn create_payment(&self, new_payment: NewPayment) -> Result<Payment>;
}

#[async_trait]
pub trait PaymentServiceTrait: Send + Sync {
    async fn record_payment(&self, request: RecordPaymentRequest) -> Result<RecordedPayment>;
    async fn get_payments(&self, capital_call_id: &str) -> Result<Vec<Payment>>;
}
