//! Core types and data structures for hospital billing

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::tax::gst::{GstCategory, GstSplit, TaxError};
use crate::utils::money::zero;
use crate::utils::validation::validate_payment_amount;

/// A patient visit as returned by the visit store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: String,
    pub patient_id: String,
    pub visit_date: NaiveDate,
    /// Prescriptions written during the visit
    #[serde(default)]
    pub prescriptions: Vec<Prescription>,
    /// Lab orders raised during the visit
    #[serde(default)]
    pub lab_orders: Vec<LabOrder>,
}

impl Visit {
    /// Create a visit with no prescriptions or lab orders
    pub fn new(id: String, patient_id: String, visit_date: NaiveDate) -> Self {
        Self {
            id,
            patient_id,
            visit_date,
            prescriptions: Vec::new(),
            lab_orders: Vec::new(),
        }
    }

    /// Whether the consultation produced any downstream orders
    pub fn has_orders(&self) -> bool {
        !self.prescriptions.is_empty() || !self.lab_orders.is_empty()
    }
}

/// A prescription written during a visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: String,
    pub items: Vec<PrescriptionItem>,
}

/// One medicine on a prescription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionItem {
    pub id: String,
    pub medicine: Medicine,
    /// Prescribed quantity in units
    pub quantity: u32,
    /// Set by the pharmacy once the item has been handed over
    pub dispensed: bool,
}

/// Pharmacy catalogue entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub id: String,
    pub name: String,
    /// e.g. "500mg"
    pub strength: String,
    /// Maximum retail price per unit, GST included
    pub mrp: BigDecimal,
    #[serde(default)]
    pub gst_category: GstCategory,
}

impl Medicine {
    /// Name and strength as printed on a bill line
    pub fn display_name(&self) -> String {
        if self.strength.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.strength)
        }
    }
}

/// A lab order raised during a visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabOrder {
    pub id: String,
    pub test: LabTest,
    pub status: LabOrderStatus,
}

/// Lab test catalogue entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTest {
    pub id: String,
    pub name: String,
    /// Price before GST
    pub price: BigDecimal,
}

/// Lab order progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabOrderStatus {
    Ordered,
    SampleCollected,
    InProgress,
    Completed,
    Cancelled,
}

/// Source of a bill line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillItemType {
    Consultation,
    Medicine,
    LabTest,
}

impl BillItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillItemType::Consultation => "CONSULTATION",
            BillItemType::Medicine => "MEDICINE",
            BillItemType::LabTest => "LAB_TEST",
        }
    }
}

/// Payment state of a bill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillStatus {
    /// Nothing paid yet
    Pending,
    /// Some amount received, balance outstanding
    PartiallyPaid,
    /// Balance settled
    Paid,
}

/// Persisted bill line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItem {
    pub id: String,
    pub item_type: BillItemType,
    /// Prescription item or lab order this line was billed from. Lookup key only.
    pub reference_id: Option<String>,
    pub description: String,
    pub quantity: u32,
    pub unit_price: BigDecimal,
    pub tax_rate: BigDecimal,
    pub is_tax_inclusive: bool,
    pub base_amount: BigDecimal,
    pub tax_amount: BigDecimal,
    pub total: BigDecimal,
}

/// A generated bill; one per visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    /// Unique identifier for the bill
    pub id: String,
    /// Human-readable number, e.g. HMS/2024/0007
    pub bill_number: String,
    pub visit_id: String,
    pub patient_id: String,
    pub subtotal: BigDecimal,
    pub tax_amount: BigDecimal,
    /// Always zero at creation
    pub discount: BigDecimal,
    /// Payable amount, net of discount
    pub total: BigDecimal,
    /// Amount still to be paid
    pub balance: BigDecimal,
    pub status: BillStatus,
    /// Staff member who generated the bill
    pub generated_by: Option<String>,
    pub generated_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub items: Vec<BillItem>,
}

impl Bill {
    /// Amount received so far
    pub fn amount_paid(&self) -> BigDecimal {
        &self.total - &self.balance
    }

    /// GST components of the bill's tax
    pub fn gst_split(&self, is_inter_state: bool) -> Result<GstSplit, TaxError> {
        GstSplit::split(self.tax_amount.clone(), is_inter_state)
    }

    /// Apply a payment to the outstanding balance
    pub fn apply_payment(&mut self, amount: &BigDecimal) -> BillingResult<()> {
        if self.status == BillStatus::Paid {
            return Err(BillingError::InvalidInput(format!(
                "Bill {} is already paid",
                self.bill_number
            )));
        }

        validate_payment_amount(amount, &self.balance)?;

        self.balance -= amount;
        self.status = if self.balance == zero() {
            BillStatus::Paid
        } else {
            BillStatus::PartiallyPaid
        };
        self.updated_at = chrono::Utc::now().naive_utc();

        Ok(())
    }
}

/// How a payment was received
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    Insurance,
    Other,
}

/// A payment recorded against a bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub bill_id: String,
    pub amount: BigDecimal,
    pub method: PaymentMethod,
    /// Receipt, card slip or UPI transaction reference
    pub reference: Option<String>,
    pub received_at: NaiveDateTime,
}

impl Payment {
    /// Create a new payment
    pub fn new(
        bill_id: String,
        amount: BigDecimal,
        method: PaymentMethod,
        reference: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            bill_id,
            amount,
            method,
            reference,
            received_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Errors that can occur while assembling or reading bills
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Tax(#[from] TaxError),
    #[error("Visit not found: {0}")]
    VisitNotFound(String),
    #[error("Bill not found: {0}")]
    BillNotFound(String),
    #[error("Bill already exists: {bill_number}")]
    AlreadyExists {
        visit_id: String,
        bill_number: String,
    },
    #[error("Nothing to bill for visit {0}")]
    NothingToBill(String),
    #[error("Duplicate bill number: {0}")]
    DuplicateBillNumber(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Result type for billing operations
pub type BillingResult<T> = Result<T, BillingError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn bill_with_total(total: i32) -> Bill {
        let now = chrono::Utc::now().naive_utc();
        Bill {
            id: "bill-1".to_string(),
            bill_number: "HMS/2024/0001".to_string(),
            visit_id: "visit-1".to_string(),
            patient_id: "patient-1".to_string(),
            subtotal: BigDecimal::from(total),
            tax_amount: BigDecimal::from(0),
            discount: BigDecimal::from(0),
            total: BigDecimal::from(total),
            balance: BigDecimal::from(total),
            status: BillStatus::Pending,
            generated_by: None,
            generated_at: now,
            updated_at: now,
            items: Vec::new(),
        }
    }

    #[test]
    fn test_apply_payment_moves_status() {
        let mut bill = bill_with_total(1000);

        bill.apply_payment(&BigDecimal::from(400)).unwrap();
        assert_eq!(bill.status, BillStatus::PartiallyPaid);
        assert_eq!(bill.balance, BigDecimal::from(600));
        assert_eq!(bill.amount_paid(), BigDecimal::from(400));

        bill.apply_payment(&BigDecimal::from(600)).unwrap();
        assert_eq!(bill.status, BillStatus::Paid);
        assert_eq!(bill.balance, BigDecimal::from(0));

        let err = bill.apply_payment(&BigDecimal::from(1)).unwrap_err();
        assert!(err.to_string().contains("already paid"));
    }

    #[test]
    fn test_overpayment_is_rejected() {
        let mut bill = bill_with_total(100);

        let err = bill.apply_payment(&BigDecimal::from(150)).unwrap_err();
        assert!(matches!(err, BillingError::InvalidInput(_)));
        assert_eq!(bill.status, BillStatus::Pending);
        assert_eq!(bill.balance, BigDecimal::from(100));
    }

    #[test]
    fn test_already_exists_message_names_bill() {
        let err = BillingError::AlreadyExists {
            visit_id: "visit-7".to_string(),
            bill_number: "HMS/2024/0007".to_string(),
        };
        assert_eq!(err.to_string(), "Bill already exists: HMS/2024/0007");
    }

    #[test]
    fn test_medicine_display_name() {
        let medicine = Medicine {
            id: "med-1".to_string(),
            name: "Paracetamol".to_string(),
            strength: "500mg".to_string(),
            mrp: BigDecimal::from(2),
            gst_category: GstCategory::General,
        };
        assert_eq!(medicine.display_name(), "Paracetamol 500mg");
    }

    #[test]
    fn test_item_type_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&BillItemType::LabTest).unwrap();
        assert_eq!(json, "\"LAB_TEST\"");

        let status = serde_json::to_string(&BillStatus::PartiallyPaid).unwrap();
        assert_eq!(status, "\"PARTIALLY_PAID\"");
    }
}
