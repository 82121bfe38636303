//! Bill assembler that turns a visit into a numbered, persisted bill

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::billing::aggregation::{aggregate_billable_items, BillableCharge};
use crate::billing::numbering::{next_bill_number, BillNumber};
use crate::config::BillingConfig;
use crate::tax::gst::{BillBreakdown, BillableItem, GstSplit, LineBreakdown};
use crate::traits::*;
use crate::types::*;
use crate::utils::money::{one_paisa, zero};
use crate::utils::validation::validate_id;

/// Main billing orchestrator: aggregation, tax, numbering and persistence
pub struct BillAssembler<S: BillStorage, V: VisitStorage> {
    bills: S,
    visits: V,
    config: BillingConfig,
}

impl<S: BillStorage + VisitStorage + Clone> BillAssembler<S, S> {
    /// Create an assembler over a single backend that stores both visits and bills
    pub fn new(storage: S, config: BillingConfig) -> Self {
        Self::with_stores(storage.clone(), storage, config)
    }
}

impl<S: BillStorage, V: VisitStorage> BillAssembler<S, V> {
    /// Create an assembler over separate bill and visit stores.
    ///
    /// The config is checked with [`BillingConfig::validate`] before each
    /// bill is generated.
    pub fn with_stores(bills: S, visits: V, config: BillingConfig) -> Self {
        Self {
            bills,
            visits,
            config,
        }
    }

    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    /// Generate the bill for a visit, numbered in the current year
    pub async fn generate_bill(
        &self,
        visit_id: &str,
        generated_by: Option<String>,
    ) -> BillingResult<Bill> {
        self.generate_bill_at(visit_id, generated_by, chrono::Utc::now().naive_utc())
            .await
    }

    /// Generate the bill for a visit with an explicit generation time.
    ///
    /// The bill number sequence is taken from the year of `generated_at`.
    #[tracing::instrument(skip(self))]
    pub async fn generate_bill_at(
        &self,
        visit_id: &str,
        generated_by: Option<String>,
        generated_at: NaiveDateTime,
    ) -> BillingResult<Bill> {
        self.config.validate()?;
        let visit = self.load_visit(visit_id).await?;

        if let Some(existing) = self.bills.find_by_visit_id(visit_id).await? {
            warn!(bill_number = %existing.bill_number, "Bill already exists for visit");
            return Err(BillingError::AlreadyExists {
                visit_id: visit_id.to_string(),
                bill_number: existing.bill_number,
            });
        }

        let charges = aggregate_billable_items(&visit, &self.config.consultation_fee);
        if charges.is_empty() {
            warn!("Visit has nothing to bill");
            return Err(BillingError::NothingToBill(visit_id.to_string()));
        }

        let breakdown = compute_breakdown(&charges)?;
        debug!(
            lines = breakdown.items.len(),
            grand_total = %breakdown.grand_total,
            "Computed bill breakdown"
        );

        let mut bill = build_bill(&visit, &charges, breakdown, generated_by, generated_at);
        let prefix = &self.config.bill_number_prefix;
        let year = generated_at.year();
        let year_prefix = BillNumber::year_prefix(prefix, year);

        for attempt in 1..=self.config.max_numbering_attempts {
            let latest = self.bills.find_latest_by_prefix(&year_prefix).await?;
            bill.bill_number = next_bill_number(prefix, year, latest.as_deref())?.to_string();

            match self.bills.create_bill(&bill).await {
                Ok(()) => {
                    info!(
                        bill_number = %bill.bill_number,
                        total = %bill.total,
                        items = bill.items.len(),
                        "Bill generated"
                    );
                    return Ok(bill);
                }
                Err(BillingError::DuplicateBillNumber(number)) => {
                    warn!(attempt, bill_number = %number, "Bill number already taken, retrying");
                }
                Err(err) => return Err(err),
            }
        }

        Err(BillingError::Conflict(format!(
            "Could not allocate a unique {} bill number for visit {} after {} attempts",
            year_prefix, visit_id, self.config.max_numbering_attempts
        )))
    }

    /// Estimate the bill for a visit without numbering or persisting it.
    ///
    /// A visit with nothing billable yields a zero-valued preview.
    #[tracing::instrument(skip(self))]
    pub async fn preview_bill(&self, visit_id: &str) -> BillingResult<BillPreview> {
        let visit = self.load_visit(visit_id).await?;
        let charges = aggregate_billable_items(&visit, &self.config.consultation_fee);
        let breakdown = compute_breakdown(&charges)?;
        let gst = GstSplit::split(breakdown.total_tax.clone(), self.config.is_inter_state)?;

        let lines = charges
            .into_iter()
            .zip(breakdown.items)
            .map(|(charge, line)| PreviewLine {
                item_type: charge.item_type,
                reference_id: charge.reference_id,
                line,
            })
            .collect();

        Ok(BillPreview {
            visit_id: visit.id,
            lines,
            subtotal: breakdown.subtotal,
            total_tax: breakdown.total_tax,
            grand_total: breakdown.grand_total,
            gst,
        })
    }

    /// Get a bill by ID
    pub async fn get_bill(&self, bill_id: &str) -> BillingResult<Bill> {
        validate_id(bill_id, "Bill")?;
        self.bills
            .find_by_id(bill_id)
            .await?
            .ok_or_else(|| BillingError::BillNotFound(bill_id.to_string()))
    }

    /// Get a bill by its number
    pub async fn get_bill_by_number(&self, bill_number: &str) -> BillingResult<Bill> {
        self.bills
            .find_by_bill_number(bill_number)
            .await?
            .ok_or_else(|| BillingError::BillNotFound(bill_number.to_string()))
    }

    /// Get the bills recorded for a visit
    pub async fn get_bills_for_visit(&self, visit_id: &str) -> BillingResult<Vec<Bill>> {
        validate_id(visit_id, "Visit")?;
        self.bills.list_bills_for_visit(visit_id).await
    }

    /// Record a payment received against a bill
    #[tracing::instrument(skip(self))]
    pub async fn record_payment(
        &self,
        bill_id: &str,
        amount: BigDecimal,
        method: PaymentMethod,
        reference: Option<String>,
    ) -> BillingResult<Payment> {
        let bill = self.get_bill(bill_id).await?;
        let payment = Payment::new(bill.id, amount, method, reference);

        let updated = self.bills.apply_payment(&payment).await?;
        info!(
            bill_number = %updated.bill_number,
            amount = %payment.amount,
            balance = %updated.balance,
            status = ?updated.status,
            "Payment recorded"
        );

        Ok(payment)
    }

    /// List payments recorded against a bill
    pub async fn get_payments_for_bill(&self, bill_id: &str) -> BillingResult<Vec<Payment>> {
        let bill = self.get_bill(bill_id).await?;
        self.bills.list_payments(&bill.id).await
    }

    /// Check that a stored bill still adds up
    pub async fn reconcile_bill(&self, bill_id: &str) -> BillingResult<BillReconciliation> {
        let bill = self.get_bill(bill_id).await?;
        let report = BillReconciliation::for_bill(&bill);
        if !report.is_valid {
            warn!(bill_number = %bill.bill_number, issues = ?report.issues, "Bill does not reconcile");
        }
        Ok(report)
    }

    async fn load_visit(&self, visit_id: &str) -> BillingResult<Visit> {
        validate_id(visit_id, "Visit")?;
        self.visits
            .get_visit(visit_id)
            .await?
            .ok_or_else(|| BillingError::VisitNotFound(visit_id.to_string()))
    }
}

fn compute_breakdown(charges: &[BillableCharge]) -> BillingResult<BillBreakdown> {
    let items: Vec<BillableItem> = charges.iter().map(|charge| charge.item.clone()).collect();
    Ok(BillBreakdown::generate(&items)?)
}

fn build_bill(
    visit: &Visit,
    charges: &[BillableCharge],
    breakdown: BillBreakdown,
    generated_by: Option<String>,
    generated_at: NaiveDateTime,
) -> Bill {
    let items = charges
        .iter()
        .zip(breakdown.items)
        .map(|(charge, line)| BillItem {
            id: uuid::Uuid::new_v4().to_string(),
            item_type: charge.item_type,
            reference_id: charge.reference_id.clone(),
            description: line.description,
            quantity: line.quantity,
            unit_price: line.unit_price,
            tax_rate: line.tax_rate,
            is_tax_inclusive: line.is_tax_inclusive,
            base_amount: line.base_amount,
            tax_amount: line.tax_amount,
            total: line.line_total,
        })
        .collect();

    Bill {
        id: uuid::Uuid::new_v4().to_string(),
        bill_number: String::new(),
        visit_id: visit.id.clone(),
        patient_id: visit.patient_id.clone(),
        subtotal: breakdown.subtotal,
        tax_amount: breakdown.total_tax,
        discount: zero(),
        total: breakdown.grand_total.clone(),
        balance: breakdown.grand_total,
        status: BillStatus::Pending,
        generated_by,
        generated_at,
        updated_at: generated_at,
        items,
    }
}

/// One previewed line with its source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewLine {
    pub item_type: BillItemType,
    pub reference_id: Option<String>,
    pub line: LineBreakdown,
}

/// Unsaved estimate of a visit's bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillPreview {
    pub visit_id: String,
    pub lines: Vec<PreviewLine>,
    pub subtotal: BigDecimal,
    pub total_tax: BigDecimal,
    pub grand_total: BigDecimal,
    /// Split of `total_tax` under the configured inter-state setting
    pub gst: GstSplit,
}

impl BillPreview {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Report on whether a bill's stored totals agree with its lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillReconciliation {
    pub bill_number: String,
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub items_subtotal: BigDecimal,
    pub items_tax: BigDecimal,
    pub items_total: BigDecimal,
    /// `total - (subtotal + tax - discount)`
    pub rounding_drift: BigDecimal,
    /// One paisa per billed unit
    pub drift_tolerance: BigDecimal,
}

impl BillReconciliation {
    /// Reconcile a bill against its own lines.
    ///
    /// Line sums must match the stored aggregates exactly. The gap between
    /// `total` and `subtotal + tax` comes from per-unit rounding of
    /// inclusive lines and may not exceed one paisa per unit billed.
    pub fn for_bill(bill: &Bill) -> Self {
        let items_subtotal: BigDecimal = bill.items.iter().map(|item| &item.base_amount).sum();
        let items_tax: BigDecimal = bill.items.iter().map(|item| &item.tax_amount).sum();
        let items_total: BigDecimal = bill.items.iter().map(|item| &item.total).sum();

        let mut issues = Vec::new();

        if items_subtotal != bill.subtotal {
            issues.push(format!(
                "Line base amounts sum to {} but subtotal is {}",
                items_subtotal, bill.subtotal
            ));
        }

        if items_tax != bill.tax_amount {
            issues.push(format!(
                "Line tax amounts sum to {} but tax amount is {}",
                items_tax, bill.tax_amount
            ));
        }

        let expected_total = &items_total - &bill.discount;
        if expected_total != bill.total {
            issues.push(format!(
                "Line totals less discount come to {} but total is {}",
                expected_total, bill.total
            ));
        }

        let units: u64 = bill.items.iter().map(|item| u64::from(item.quantity)).sum();
        let drift_tolerance = one_paisa() * BigDecimal::from(units);
        let rounding_drift = &bill.total - (&bill.subtotal + &bill.tax_amount - &bill.discount);
        if rounding_drift.abs() > drift_tolerance {
            issues.push(format!(
                "Rounding drift {} exceeds tolerance {}",
                rounding_drift, drift_tolerance
            ));
        }

        if bill.balance < zero() || bill.balance > bill.total {
            issues.push(format!(
                "Balance {} is outside 0..={}",
                bill.balance, bill.total
            ));
        }

        Self {
            bill_number: bill.bill_number.clone(),
            is_valid: issues.is_empty(),
            issues,
            items_subtotal,
            items_tax,
            items_total,
            rounding_drift,
            drift_tolerance,
        }
    }
}
