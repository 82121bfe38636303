//! Collecting billable events from a visit

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::tax::gst::{BillableItem, GstCategory};
use crate::types::*;

/// Description printed on the consultation line
pub const CONSULTATION_DESCRIPTION: &str = "Doctor Consultation Fee";

/// A billable item together with where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillableCharge {
    pub item_type: BillItemType,
    /// Prescription item or lab order id
    pub reference_id: Option<String>,
    pub item: BillableItem,
}

impl BillableCharge {
    /// Consultation fee, GST added on top at the service rate
    pub fn consultation(fee: &BigDecimal) -> Self {
        Self {
            item_type: BillItemType::Consultation,
            reference_id: None,
            item: BillableItem::new(
                CONSULTATION_DESCRIPTION.to_string(),
                1,
                fee.clone(),
                GstCategory::Service.rate(),
                false,
            ),
        }
    }

    /// Dispensed medicine at MRP, GST included
    pub fn medicine(item: &PrescriptionItem) -> Self {
        Self {
            item_type: BillItemType::Medicine,
            reference_id: Some(item.id.clone()),
            item: BillableItem::new(
                item.medicine.display_name(),
                item.quantity,
                item.medicine.mrp.clone(),
                item.medicine.gst_category.rate(),
                true,
            ),
        }
    }

    /// Completed lab test, GST added on top at the service rate
    pub fn lab_test(order: &LabOrder) -> Self {
        Self {
            item_type: BillItemType::LabTest,
            reference_id: Some(order.id.clone()),
            item: BillableItem::new(
                order.test.name.clone(),
                1,
                order.test.price.clone(),
                GstCategory::Service.rate(),
                false,
            ),
        }
    }
}

/// Gather everything billable for a visit.
///
/// The consultation fee is charged only when the visit produced at least one
/// prescription or lab order. Then come dispensed prescription items in
/// prescription order, then completed lab orders.
pub fn aggregate_billable_items(visit: &Visit, consultation_fee: &BigDecimal) -> Vec<BillableCharge> {
    let mut charges = Vec::new();

    if visit.has_orders() {
        charges.push(BillableCharge::consultation(consultation_fee));
    }

    charges.extend(
        visit
            .prescriptions
            .iter()
            .flat_map(|prescription| prescription.items.iter())
            .filter(|item| item.dispensed)
            .map(BillableCharge::medicine),
    );

    charges.extend(
        visit
            .lab_orders
            .iter()
            .filter(|order| order.status == LabOrderStatus::Completed)
            .map(BillableCharge::lab_test),
    );

    charges
}
