//! In-memory storage implementation for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::billing::numbering::BillNumber;
use crate::traits::*;
use crate::types::*;

/// In-memory visit, bill and payment store for testing and development
///
/// Clones share the same underlying data.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    visits: Arc<RwLock<HashMap<String, Visit>>>,
    bills: Arc<RwLock<HashMap<String, Bill>>>,
    payments: Arc<RwLock<HashMap<String, Vec<Payment>>>>,
}

fn poisoned<T>(_: PoisonError<T>) -> BillingError {
    BillingError::Storage("In-memory storage lock poisoned".to_string())
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            visits: Arc::new(RwLock::new(HashMap::new())),
            bills: Arc::new(RwLock::new(HashMap::new())),
            payments: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Add or replace a visit
    pub fn insert_visit(&self, visit: Visit) -> BillingResult<()> {
        self.visits
            .write()
            .map_err(poisoned)?
            .insert(visit.id.clone(), visit);
        Ok(())
    }

    /// Number of stored bills
    pub fn bill_count(&self) -> BillingResult<usize> {
        Ok(self.bills.read().map_err(poisoned)?.len())
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> BillingResult<()> {
        self.visits.write().map_err(poisoned)?.clear();
        self.bills.write().map_err(poisoned)?.clear();
        self.payments.write().map_err(poisoned)?.clear();
        Ok(())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisitStorage for MemoryStorage {
    async fn get_visit(&self, visit_id: &str) -> BillingResult<Option<Visit>> {
        Ok(self.visits.read().map_err(poisoned)?.get(visit_id).cloned())
    }
}

#[async_trait]
impl BillStorage for MemoryStorage {
    async fn find_by_id(&self, bill_id: &str) -> BillingResult<Option<Bill>> {
        Ok(self.bills.read().map_err(poisoned)?.get(bill_id).cloned())
    }

    async fn find_by_visit_id(&self, visit_id: &str) -> BillingResult<Option<Bill>> {
        let bills = self.bills.read().map_err(poisoned)?;
        Ok(bills.values().find(|bill| bill.visit_id == visit_id).cloned())
    }

    async fn find_by_bill_number(&self, bill_number: &str) -> BillingResult<Option<Bill>> {
        let bills = self.bills.read().map_err(poisoned)?;
        Ok(bills
            .values()
            .find(|bill| bill.bill_number == bill_number)
            .cloned())
    }

    async fn find_latest_by_prefix(&self, prefix: &str) -> BillingResult<Option<String>> {
        let bills = self.bills.read().map_err(poisoned)?;
        let latest = bills
            .values()
            .filter(|bill| bill.bill_number.starts_with(prefix))
            .filter_map(|bill| BillNumber::parse(&bill.bill_number).ok())
            .max_by_key(|number| number.sequence);
        Ok(latest.map(|number| number.to_string()))
    }

    async fn list_bills_for_visit(&self, visit_id: &str) -> BillingResult<Vec<Bill>> {
        let bills = self.bills.read().map_err(poisoned)?;
        let mut filtered: Vec<Bill> = bills
            .values()
            .filter(|bill| bill.visit_id == visit_id)
            .cloned()
            .collect();
        filtered.sort_by(|a, b| a.generated_at.cmp(&b.generated_at));
        Ok(filtered)
    }

    async fn create_bill(&self, bill: &Bill) -> BillingResult<()> {
        // Both uniqueness checks and the insert happen under one write lock.
        let mut bills = self.bills.write().map_err(poisoned)?;

        if let Some(existing) = bills.values().find(|b| b.visit_id == bill.visit_id) {
            return Err(BillingError::AlreadyExists {
                visit_id: bill.visit_id.clone(),
                bill_number: existing.bill_number.clone(),
            });
        }

        if bills.values().any(|b| b.bill_number == bill.bill_number) {
            return Err(BillingError::DuplicateBillNumber(bill.bill_number.clone()));
        }

        if bills.contains_key(&bill.id) {
            return Err(BillingError::Storage(format!(
                "Bill ID already in use: {}",
                bill.id
            )));
        }

        bills.insert(bill.id.clone(), bill.clone());
        Ok(())
    }

    async fn apply_payment(&self, payment: &Payment) -> BillingResult<Bill> {
        let mut bills = self.bills.write().map_err(poisoned)?;
        let bill = bills
            .get_mut(&payment.bill_id)
            .ok_or_else(|| BillingError::BillNotFound(payment.bill_id.clone()))?;

        let mut updated = bill.clone();
        updated.apply_payment(&payment.amount)?;

        self.payments
            .write()
            .map_err(poisoned)?
            .entry(payment.bill_id.clone())
            .or_default()
            .push(payment.clone());
        *bill = updated.clone();

        Ok(updated)
    }

    async fn list_payments(&self, bill_id: &str) -> BillingResult<Vec<Payment>> {
        let payments = self.payments.read().map_err(poisoned)?;
        Ok(payments.get(bill_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn bill(id: &str, visit_id: &str, bill_number: &str) -> Bill {
        let now = chrono::Utc::now().naive_utc();
        Bill {
            id: id.to_string(),
            bill_number: bill_number.to_string(),
            visit_id: visit_id.to_string(),
            patient_id: "patient-1".to_string(),
            subtotal: BigDecimal::from(100),
            tax_amount: BigDecimal::from(18),
            discount: BigDecimal::from(0),
            total: BigDecimal::from(118),
            balance: BigDecimal::from(118),
            status: BillStatus::Pending,
            generated_by: None,
            generated_at: now,
            updated_at: now,
            items: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_visit_lookup() {
        let storage = MemoryStorage::new();
        storage
            .insert_visit(Visit::new(
                "visit-1".to_string(),
                "patient-1".to_string(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            ))
            .unwrap();

        assert!(storage.get_visit("visit-1").await.unwrap().is_some());
        assert!(storage.get_visit("visit-2").await.unwrap().is_none());

        storage.clear().unwrap();
        assert!(storage.get_visit("visit-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_bill_enforces_uniqueness() {
        let storage = MemoryStorage::new();
        storage
            .create_bill(&bill("b1", "visit-1", "HMS/2024/0001"))
            .await
            .unwrap();

        let same_visit = storage
            .create_bill(&bill("b2", "visit-1", "HMS/2024/0002"))
            .await;
        assert!(matches!(
            same_visit,
            Err(BillingError::AlreadyExists { ref bill_number, .. }) if bill_number == "HMS/2024/0001"
        ));

        let same_number = storage
            .create_bill(&bill("b3", "visit-3", "HMS/2024/0001"))
            .await;
        assert!(matches!(same_number, Err(BillingError::DuplicateBillNumber(_))));

        assert_eq!(storage.bill_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_latest_by_prefix_uses_highest_sequence() {
        let storage = MemoryStorage::new();
        for (id, number) in [
            ("b1", "HMS/2024/9999"),
            ("b2", "HMS/2024/10000"),
            ("b3", "HMS/2025/0003"),
            ("b4", "HMS/2024/0042"),
        ] {
            storage
                .create_bill(&bill(id, &format!("visit-{}", id), number))
                .await
                .unwrap();
        }

        let latest = storage.find_latest_by_prefix("HMS/2024/").await.unwrap();
        assert_eq!(latest.as_deref(), Some("HMS/2024/10000"));

        let none = storage.find_latest_by_prefix("HMS/2023/").await.unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_rejected_payment_leaves_bill_untouched() {
        let storage = MemoryStorage::new();
        storage
            .create_bill(&bill("b1", "visit-1", "HMS/2024/0001"))
            .await
            .unwrap();

        let payment = Payment::new(
            "b1".to_string(),
            BigDecimal::from(200),
            PaymentMethod::Cash,
            None,
        );
        assert!(storage.apply_payment(&payment).await.is_err());

        let stored = storage.find_by_id("b1").await.unwrap().unwrap();
        assert_eq!(stored.balance, BigDecimal::from(118));
        assert!(storage.list_payments("b1").await.unwrap().is_empty());
    }
}
