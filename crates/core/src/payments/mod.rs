//! Payments module - the append-only payment log and its ledger arithmetic.

mod ledger;
mod payments_model;
mod payments_service;
mod payments_traits;


pub use ledger::{apply_payment, summarize_payments, LedgerOutcome, PaymentTotals};
pub use payments_model::{NewPayment, Payment, PaymentType, RecordPaymentRequest, RecordedPayment};
pub use payments_service::PaymentService;
pub use payments_traits::{PaymentRepositoryTrait, PaymentServiceTrait};
