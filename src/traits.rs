//! Traits for the storage collaborators of the bill assembler

use async_trait::async_trait;

use crate::types::*;

/// Read access to patient visits
///
/// Backed by whatever owns the visit, prescription and lab order records.
#[async_trait]
pub trait VisitStorage: Send + Sync {
    /// Get a visit with its prescriptions and lab orders
    async fn get_visit(&self, visit_id: &str) -> BillingResult<Option<Visit>>;
}

/// Storage abstraction for bills and payments
///
/// Implementations must enforce uniqueness of both `visit_id` and
/// `bill_number` at insert time. Those constraints are the authoritative
/// guard against concurrent generation; the assembler's own pre-checks are
/// only an early exit.
#[async_trait]
pub trait BillStorage: Send + Sync {
    /// Get a bill by ID
    async fn find_by_id(&self, bill_id: &str) -> BillingResult<Option<Bill>>;

    /// Get the bill generated for a visit
    async fn find_by_visit_id(&self, visit_id: &str) -> BillingResult<Option<Bill>>;

    /// Get a bill by its human-readable number
    async fn find_by_bill_number(&self, bill_number: &str) -> BillingResult<Option<Bill>>;

    /// Bill number with the highest sequence among those starting with `prefix`
    async fn find_latest_by_prefix(&self, prefix: &str) -> BillingResult<Option<String>>;

    /// List every bill recorded for a visit
    async fn list_bills_for_visit(&self, visit_id: &str) -> BillingResult<Vec<Bill>>;

    /// Persist a bill together with its items as one unit.
    ///
    /// Must fail with [`BillingError::AlreadyExists`] when the visit already
    /// has a bill and with [`BillingError::DuplicateBillNumber`] when the
    /// number is taken, leaving nothing written in either case.
    async fn create_bill(&self, bill: &Bill) -> BillingResult<()>;

    /// Apply a payment to its bill and persist both as one unit.
    ///
    /// Implementations run [`Bill::apply_payment`] against the stored bill
    /// inside their transaction and return the updated bill.
    async fn apply_payment(&self, payment: &Payment) -> BillingResult<Bill>;

    /// List payments recorded against a bill, oldest first
    async fn list_payments(&self, bill_id: &str) -> BillingResult<Vec<Payment>>;
}
